use anyhow::Context;
use bookstore_app::books::{repository::MongoBookRepository, seed};
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about = "Book store administration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Serve the `/books` API
    Serve,
    /// Wipe the books collection and load the sample catalog
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load book store settings")?;
    bookstore_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve => bookstore_app::serve(settings).await,
        Command::Seed => {
            if let Err(err) = run_seed(&settings).await {
                tracing::error!(error = ?err, "error seeding books");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn run_seed(settings: &Settings) -> anyhow::Result<()> {
    let connection = bookstore_db::connect(&settings.database).await?;
    bookstore_db::ping(&connection.database).await?;

    let repository =
        MongoBookRepository::new(&connection.database, &settings.database.collection);
    let report = seed::seed_books(&repository)
        .await
        .context("failed to reset the books collection")?;

    tracing::info!(
        cleared = report.cleared,
        inserted = report.inserted,
        "seeding complete"
    );

    connection.shutdown().await;
    Ok(())
}
