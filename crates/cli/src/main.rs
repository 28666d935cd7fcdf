//! Hauler CLI - push jobs into a queue store and inspect it

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use hauler_core::application::{Client, PushRequest, QueueStats};
use hauler_core::domain::options::{default_locator, QUEUE_URL_ENV};
use hauler_core::domain::JobState;
use hauler_core::port::id_provider::UuidProvider;
use hauler_core::port::time_provider::SystemTimeProvider;
use hauler_core::port::TimeProvider;
use hauler_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};
use std::sync::Arc;
use tabled::{Table, Tabled};

#[derive(Parser)]
#[command(name = "hauler-cli")]
#[command(about = "Hauler queue store CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Queue store locator (default: $HAULER_QUEUE_URL or sqlite://hauler.db)
    #[arg(short, long, global = true, value_name = "LOCATOR")]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue a new job
    Push {
        /// Handler class declared by the host application
        #[arg(long)]
        class: String,

        /// Queue name
        #[arg(short, long, default_value = "default")]
        queue: String,

        /// Handler arguments as a JSON array
        #[arg(short, long, default_value = "[]")]
        args: String,
    },

    /// Show job counts per queue and state
    Stats,
}

#[derive(Tabled)]
struct PushResult {
    job_id: String,
    queue: String,
    class: String,
}

#[derive(Tabled)]
struct StatsRow {
    queue: String,
    queued: i64,
    running: i64,
    done: i64,
    failed: i64,
}

fn stats_rows(stats: &QueueStats) -> Vec<StatsRow> {
    stats
        .iter()
        .map(|(queue, counts)| {
            let count = |state: JobState| counts.get(&state).copied().unwrap_or(0);
            StatsRow {
                queue: queue.clone(),
                queued: count(JobState::Queued),
                running: count(JobState::Running),
                done: count(JobState::Done),
                failed: count(JobState::Failed),
            }
        })
        .collect()
}

async fn connect(locator: &str) -> Result<Client> {
    let pool = create_pool(locator)
        .await
        .with_context(|| format!("Failed to open queue store {}", locator))?;
    run_migrations(&pool).await.context("Migration failed")?;

    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteJobStore::new(pool, Arc::clone(&time_provider)));
    Ok(Client::new(store, Arc::new(UuidProvider), time_provider))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let locator = cli
        .server
        .unwrap_or_else(|| default_locator(|key| std::env::var(key).ok()));
    let client = connect(&locator).await?;

    match cli.command {
        Commands::Push { class, queue, args } => {
            let args: serde_json::Value =
                serde_json::from_str(&args).context("Invalid JSON args")?;
            let request = PushRequest::new(class.clone(), args).on_queue(queue.clone());

            let job_id = client.push(request).await?;

            println!("{}", "✓ Job pushed".green().bold());
            println!();
            println!(
                "{}",
                Table::new(vec![PushResult {
                    job_id,
                    queue,
                    class
                }])
            );
        }

        Commands::Stats => {
            let stats = client.stats().await?;

            println!("{} {}", "Queue store:".bold(), locator);
            if stats.is_empty() {
                println!("{}", format!("No jobs (set ${} to pick a store)", QUEUE_URL_ENV).yellow());
            } else {
                println!("{}", Table::new(stats_rows(&stats)));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_stats_rows_fill_missing_states() {
        let mut stats = QueueStats::new();
        stats.insert(
            "mail".to_string(),
            BTreeMap::from([(JobState::Queued, 2), (JobState::Failed, 1)]),
        );

        let rows = stats_rows(&stats);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].queue, "mail");
        assert_eq!(rows[0].queued, 2);
        assert_eq!(rows[0].running, 0);
        assert_eq!(rows[0].failed, 1);
    }

    #[tokio::test]
    async fn test_push_then_stats_in_memory() {
        let client = connect("sqlite::memory:").await.unwrap();
        client
            .push(PushRequest::new("Mailer", serde_json::json!([1])).on_queue("mail"))
            .await
            .unwrap();

        let rows = stats_rows(&client.stats().await.unwrap());
        assert_eq!(rows[0].queue, "mail");
        assert_eq!(rows[0].queued, 1);
    }

    #[test]
    fn test_parse_push() {
        let cli = Cli::try_parse_from([
            "hauler-cli", "push", "--class", "Mailer", "-q", "mail", "-a", "[1,2]", "-s",
            "sqlite::memory:",
        ])
        .unwrap();

        assert_eq!(cli.server.as_deref(), Some("sqlite::memory:"));
        match cli.command {
            Commands::Push { class, queue, args } => {
                assert_eq!(class, "Mailer");
                assert_eq!(queue, "mail");
                assert_eq!(args, "[1,2]");
            }
            Commands::Stats => panic!("expected push"),
        }
    }
}
