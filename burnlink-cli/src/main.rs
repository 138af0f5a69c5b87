mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{extract_key, BurnlinkClient};
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "burnlink-cli")]
#[command(about = "Share and redeem one-time secrets")]
struct Cli {
    /// burnlink server to talk to
    #[arg(
        long,
        global = true,
        env = "BURNLINK_SERVER",
        default_value = "http://127.0.0.1:8080"
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a secret (from a file or stdin) and print its one-time link
    Store {
        /// Read the secret from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Redeem a link or key and write the secret to stdout
    Fetch {
        /// Retrieval link or bare key
        key_or_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = BurnlinkClient::new(&cli.server);

    match cli.command {
        Commands::Store { file } => {
            let secret = match file {
                Some(path) => std::fs::read(&path)
                    .with_context(|| format!("could not read {}", path.display()))?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };
            let url = client.store(secret).await?;
            println!("{}", url);
        }
        Commands::Fetch { key_or_url } => {
            let key = extract_key(&key_or_url)?;
            let secret = client.fetch(key).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&secret)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
