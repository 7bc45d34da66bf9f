use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};

use surveyor::auth::{self, AuthStorage};
use surveyor::consts::{DEFAULT_HISTORY_LIMIT, DEFAULT_MODEL, ENV_API_KEY, SERVICE};
use surveyor::ledger::Ledger;
use surveyor::ledger::sqlite::SqliteLedger;
use surveyor::render;
use surveyor::research::exa::ExaResearch;
use surveyor::research::poll::{PollConfig, poll_task_with};
use surveyor::research::{CreateTaskRequest, Research, Task, list_all};
use surveyor::schema::OutputSchema;
use surveyor::showcase;
use surveyor::spinner::Spinner;

#[derive(Parser)]
#[command(
    name = "surveyor",
    version,
    about = "Deep research from your terminal, via a hosted research service."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database path for credentials and task history
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable debug logging (or set SURVEYOR_LOG)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Store an API key for the research service
    Login,
    /// Remove the stored API key
    Logout,
    /// Submit a research task
    Create {
        /// Natural-language research instructions
        #[arg(short, long)]
        instructions: String,

        /// Path to a JSON Schema file constraining the result shape
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Research model to use
        #[arg(short, long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Wait for completion and print the result
        #[arg(short, long, default_value_t = false)]
        wait: bool,
    },
    /// Fetch a single task by id
    Get { id: String },
    /// List tasks known to the service
    List {
        /// Page size requested from the service
        #[arg(short, long)]
        limit: Option<u32>,

        /// Follow pagination to the end
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Poll a task until it reaches a terminal state
    Poll {
        id: String,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 900)]
        timeout_secs: u64,

        /// Initial interval between status checks, in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Show tasks submitted from this machine
    History {
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
    /// Run the bundled end-to-end example against the live service
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let db_path = cli.db.unwrap_or_else(surveyor::consts::default_db_path);
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db = db_path.to_string_lossy().into_owned();

    match cli.command {
        Command::Login => {
            print!("Paste your API key: ");
            io::stdout().flush()?;
            let mut key = String::new();
            io::stdin().read_line(&mut key)?;

            auth::login(&db, SERVICE, &key)?;
            println!("✓ API key saved.");
            return Ok(());
        }
        Command::Logout => {
            auth::logout(&db, SERVICE)?;
            println!("✓ API key removed.");
            return Ok(());
        }
        _ => {}
    }

    // Everything below talks to the service, so resolve credentials first.
    let storage = AuthStorage::open(&db)?;
    let api_key = storage
        .resolve(SERVICE, ENV_API_KEY)?
        .ok_or_else(|| anyhow!("no API key found. Run `surveyor login` or set {ENV_API_KEY}."))?;
    let research = ExaResearch::new(api_key);
    let ledger = SqliteLedger::open(&db)?;

    match cli.command {
        Command::Login | Command::Logout => unreachable!("handled above"),

        Command::Create {
            instructions,
            schema,
            model,
            wait,
        } => {
            let mut request = CreateTaskRequest::new(instructions, model);
            if let Some(path) = schema {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read schema file {}", path.display()))?;
                let value: serde_json::Value = serde_json::from_str(&text)
                    .with_context(|| format!("schema file {} is not valid JSON", path.display()))?;
                request = request.with_schema(OutputSchema::raw(value)?);
            }

            let created = research.create_task(&request).await?;
            ledger.record(&created.id, &request).await?;
            println!("Created task {}", created.id);

            if wait {
                let task =
                    poll_with_spinner(&research, &created.id, &PollConfig::default()).await?;
                ledger.update_status(&created.id, task.status).await?;
                print_final_state(&task);
            }
        }

        Command::Get { id } => {
            let task = research.get_task(&id).await?;
            println!("{}", render::pretty(&serde_json::to_value(&task)?));
        }

        Command::List { limit, all } => {
            if all {
                for task in list_all(&research).await? {
                    println!("{}", render::task_line(&task));
                }
            } else {
                let page = research.list_tasks(None, limit).await?;
                for task in &page.data {
                    println!("{}", render::task_line(task));
                }
                if page.has_more {
                    println!("(more available — pass --all)");
                }
            }
        }

        Command::Poll {
            id,
            timeout_secs,
            interval_ms,
        } => {
            let config = PollConfig {
                initial_interval: Duration::from_millis(interval_ms),
                timeout: Duration::from_secs(timeout_secs),
                ..PollConfig::default()
            };

            let task = poll_with_spinner(&research, &id, &config).await?;
            ledger.update_status(&id, task.status).await?;
            print_final_state(&task);
        }

        Command::History { limit } => {
            for record in ledger.history(limit).await? {
                println!("{}", render::record_line(&record));
            }
        }

        Command::Demo => {
            showcase::run(&research, &ledger, DEFAULT_MODEL, &PollConfig::default()).await?;
        }
    }

    Ok(())
}

/// Poll with a spinner on stderr showing status and elapsed time.
async fn poll_with_spinner(
    research: &dyn Research,
    id: &str,
    config: &PollConfig,
) -> anyhow::Result<Task> {
    let spinner = Spinner::start(&format!("{id} · waiting"));
    let result = poll_task_with(research, id, config, |status, elapsed| {
        spinner.set_message(format!(
            "{id} · {status} · {}",
            render::format_elapsed(elapsed)
        ));
    })
    .await;
    spinner.stop().await;
    result
}

fn print_final_state(task: &Task) {
    println!("Final Task State for {}:", task.id);
    match &task.data {
        Some(data) => println!("{}", render::pretty(data)),
        None => match &task.failure_reason {
            Some(reason) => println!("(no result — task {}: {reason})", task.status),
            None => println!("(no result — task {})", task.status),
        },
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SURVEYOR_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
