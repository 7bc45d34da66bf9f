//! surveyor: a client and CLI for Exa's hosted deep-research task service.
//!
//! Submit natural-language research instructions plus a JSON output
//! schema, list outstanding tasks, and poll until the service has
//! materialized a result.

pub mod auth;
pub mod consts;
pub mod ledger;
pub mod render;
pub mod research;
pub mod schema;
pub mod showcase;
pub mod spinner;
