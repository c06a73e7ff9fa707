use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use shuttle_core::app::SubmitRequest;
use shuttle_core::app::submission::{DEFAULT_ALPHA, DEFAULT_BETA};
use shuttle_core::domain::{Owner, TaskId, TaskStatus};
use shuttle_core::{AppBuilder, Settings};

#[derive(Parser, Debug)]
#[command(name = "shuttle")]
#[command(version)]
#[command(about = "Filesystem-backed job queue")]
struct Args {
    /// Settings file (defaults to $SHUTTLE_SETTINGS, then built-in defaults)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Increase verbosity (-v error, -vv warn, -vvv info, -vvvv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run tasks from the queue until interrupted
    Runner {
        /// Root of the task tree
        #[arg(long)]
        taskdir: Option<PathBuf>,

        /// Seconds to sleep when there is no work
        #[arg(long)]
        wait_time: Option<u64>,

        /// Do not process delete requests
        #[arg(long)]
        disable_delete: bool,

        /// Skip startup recovery of interrupted tasks
        #[arg(long)]
        no_recover: bool,
    },

    /// Submit a new task
    Submit {
        /// Input payload
        file: PathBuf,

        #[arg(long, default_value_t = DEFAULT_ALPHA)]
        alpha: f64,

        #[arg(long, default_value_t = DEFAULT_BETA)]
        beta: f64,

        /// Address recorded as the task owner
        #[arg(long, default_value = "127.0.0.1")]
        owner: String,
    },

    /// Show the status of a task
    Status {
        id: String,

        /// Wait for the task to finish first
        #[arg(long)]
        wait: bool,
    },

    /// Request deletion of a task
    Delete {
        id: String,

        /// Address recorded with the request
        #[arg(long, default_value = "127.0.0.1")]
        requester: String,
    },

    /// Count tasks per stage
    Counts,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 | 1 => "error",
        2 => "warn",
        3 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::from_env()?,
    };
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let mut settings = load_settings(args.settings.as_ref()).context("loading settings")?;

    match args.command {
        Commands::Runner {
            taskdir,
            wait_time,
            disable_delete,
            no_recover,
        } => {
            if let Some(taskdir) = taskdir {
                settings.runner.task_dir = taskdir;
            }
            if let Some(wait_time) = wait_time {
                settings.runner.wait_time = wait_time;
            }
            settings.runner.delete_enabled &= !disable_delete;
            settings.runner.recover_on_start &= !no_recover;

            let mut runner = AppBuilder::new(settings).build_runner()?;
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received, stopping after the current task");
                }
                // ignore send error: the runner may already be gone
                let _ = shutdown_tx.send(true);
            });
            runner.run(shutdown_rx).await;
        }

        Commands::Submit {
            file,
            alpha,
            beta,
            owner,
        } => {
            let payload = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let owner = Owner::parse(&owner)?;
            let app = AppBuilder::new(settings).build();
            let receipt = app
                .submission
                .submit(&owner, SubmitRequest::new(payload).with_alpha(alpha).with_beta(beta))
                .await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }

        Commands::Status { id, wait } => {
            let id = TaskId::parse(&id)?;
            let app = AppBuilder::new(settings).build();
            if wait {
                let service = &app.settings().service;
                let found = app
                    .status
                    .wait(&id, service.wait_count, service.sleep_interval())
                    .await?;
                if found.is_none() {
                    tracing::warn!(task_id = %id, "task did not finish in time");
                }
            }
            let status = app.status.query(&id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if status == TaskStatus::NotFound {
                std::process::exit(1);
            }
        }

        Commands::Delete { id, requester } => {
            let app = AppBuilder::new(settings).build();
            let id = app.deletes.request_delete(&id, &requester).await?;
            println!("delete requested for {id}");
        }

        Commands::Counts => {
            let app = AppBuilder::new(settings).build();
            let counts = app.counts().await?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
    }

    Ok(())
}
