use anyhow::Result;
use clap::Parser;

use bookstore_client::{ui, HttpBooksApi};

/// Terminal client for the book store API
#[derive(Parser, Debug)]
#[command(name = "bookstore-client", version, about)]
struct Args {
    /// Base URL of the book store server
    #[arg(long, env = "BOOKSTORE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Allow missing `.env` files without failing.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // No subscriber here: the terminal is owned by the UI
    let api = HttpBooksApi::new(&args.api_url);
    ui::run(&api).await
}
