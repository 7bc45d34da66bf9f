//! The bundled end-to-end example: two research tasks with structured
//! output schemas, submitted, listed, and polled to completion.
//!
//! This is what `surveyor demo` runs. The payloads are fixed so the flow
//! is reproducible: create each task, confirm the ids show up in the
//! listing, then poll each one and print its result as JSON.

use anyhow::Result;
use serde_json::json;

use crate::ledger::Ledger;
use crate::render;
use crate::research::poll::{PollConfig, poll_task};
use crate::research::{CreateTaskRequest, Research, list_all};
use crate::schema::OutputSchema;

/// The bundled example requests.
///
/// 1. A decade-by-decade timeline of San Francisco history.
/// 2. Three recent news stories on environmental policy.
pub fn bundled(model: &str) -> Result<Vec<CreateTaskRequest>> {
    let timeline = OutputSchema::raw(json!({
        "type": "object",
        "required": ["timeline"],
        "properties": {
            "timeline": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["decade", "notableEvents"],
                    "properties": {
                        "decade": {
                            "type": "string",
                            "description": "Decade label e.g. \"1850s\""
                        },
                        "notableEvents": {
                            "type": "string",
                            "description": "A summary of notable events."
                        }
                    }
                }
            }
        },
        "additionalProperties": false
    }))?;

    let stories = OutputSchema::raw(json!({
        "type": "object",
        "required": ["stories"],
        "properties": {
            "stories": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title", "publication", "date", "summary"],
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "Headline of the article."
                        },
                        "publication": {
                            "type": "string",
                            "description": "Name of the news outlet."
                        },
                        "date": {
                            "type": "string",
                            "description": "Publication date in ISO-8601 format."
                        },
                        "summary": {
                            "type": "string",
                            "description": "One-sentence summary of the article."
                        }
                    }
                }
            }
        },
        "additionalProperties": false
    }))?;

    Ok(vec![
        CreateTaskRequest::new(
            "Summarize the history of San Francisco highlighting one or two major \
             events for each decade from 1850 to 1950",
            model,
        )
        .with_schema(timeline),
        CreateTaskRequest::new(
            "Compile three major news stories related to environmental policy from \
             the last week. For each story, include the article title, publication \
             name, publication date, and a one-sentence summary.",
            model,
        )
        .with_schema(stories),
    ])
}

/// Created ids that do not appear in the listing.
pub fn missing_ids<'a>(created: &'a [String], listed: &[&str]) -> Vec<&'a str> {
    created
        .iter()
        .map(String::as_str)
        .filter(|id| !listed.contains(id))
        .collect()
}

/// Run the example end to end: create both tasks, verify they show up in
/// the listing, then poll each to a terminal state and print its result.
pub async fn run(
    research: &dyn Research,
    ledger: &dyn Ledger,
    model: &str,
    poll: &PollConfig,
) -> Result<()> {
    let requests = bundled(model)?;

    let mut created = Vec::new();
    for request in &requests {
        let task = research.create_task(request).await?;
        ledger.record(&task.id, request).await?;
        created.push(task.id);
    }
    println!("Created Task IDs: {created:?}");

    let listed = list_all(research).await?;
    let listed_ids: Vec<&str> = listed.iter().map(|t| t.id.as_str()).collect();
    let missing = missing_ids(&created, &listed_ids);
    println!(
        "All created tasks present in list: {}",
        missing.is_empty()
    );
    println!("Polling until research completion…");

    for id in &created {
        let task = poll_task(research, id, poll).await?;
        ledger.update_status(id, task.status).await?;

        println!("Final Task State for {id}:");
        match &task.data {
            Some(data) => println!("{}", render::pretty(data)),
            None => println!("(no result — task {})", task.status),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundled_builds_two_requests() {
        let requests = bundled("exa-research").unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.model, "exa-research");
            assert!(request.output.is_some());
        }
    }

    #[test]
    fn timeline_request_body_is_exact() {
        let requests = bundled("exa-research").unwrap();
        let body = serde_json::to_value(&requests[0]).unwrap();

        assert_eq!(
            body["instructions"],
            json!(
                "Summarize the history of San Francisco highlighting one or two major \
                 events for each decade from 1850 to 1950"
            )
        );

        let schema = &body["output"]["schema"];
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["required"], json!(["timeline"]));
        assert_eq!(schema["additionalProperties"], json!(false));

        let items = &schema["properties"]["timeline"]["items"];
        assert_eq!(items["required"], json!(["decade", "notableEvents"]));
        assert_eq!(
            items["properties"]["decade"]["description"],
            json!("Decade label e.g. \"1850s\"")
        );
    }

    #[test]
    fn stories_request_body_is_exact() {
        let requests = bundled("exa-research").unwrap();
        let body = serde_json::to_value(&requests[1]).unwrap();

        assert_eq!(
            body["instructions"],
            json!(
                "Compile three major news stories related to environmental policy from \
                 the last week. For each story, include the article title, publication \
                 name, publication date, and a one-sentence summary."
            )
        );

        let items = &body["output"]["schema"]["properties"]["stories"]["items"];
        assert_eq!(
            items["required"],
            json!(["title", "publication", "date", "summary"])
        );
        assert_eq!(
            items["properties"]["date"]["description"],
            json!("Publication date in ISO-8601 format.")
        );
    }

    #[test]
    fn missing_ids_reports_absent_entries() {
        let created = vec!["task_01".to_string(), "task_02".to_string()];

        assert!(missing_ids(&created, &["task_01", "task_02", "task_03"]).is_empty());
        assert_eq!(missing_ids(&created, &["task_01"]), vec!["task_02"]);
        assert_eq!(
            missing_ids(&created, &[]),
            vec!["task_01", "task_02"]
        );
    }
}
