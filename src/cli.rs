use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::load_config::load_config;
use crate::pipeline::run_pipeline;

/// CLI for static-hosting: clone a page and host it on an S3 static website.
#[derive(Parser)]
#[clap(
    name = "static-hosting",
    version,
    about = "Fetch a web page and publish it to a public S3 static-website bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the page and publish it to the bucket named in the config file
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// URL to fetch; prompted interactively when omitted
        #[clap(long)]
        url: Option<String>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish { config, url } => {
            let url = match url {
                Some(url) => url,
                None => prompt_for_url()?,
            };
            let config = load_config(config, url)?;
            println!("Publish starting...");
            match run_pipeline(&config).await {
                Ok(report) => {
                    println!("Publish complete.\nReport:");
                    println!("{report:#?}");
                    println!("Your website is hosted at: {}", report.endpoint);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Publish failed: {e}");
                    Err(e)
                }
            }
        }
    }
}

/// Interactive fallback matching the original workflow's prompt.
fn prompt_for_url() -> Result<String> {
    print!("Enter the valid website URL: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let url = line.trim().to_string();
    if url.is_empty() {
        anyhow::bail!("No URL provided");
    }
    Ok(url)
}
