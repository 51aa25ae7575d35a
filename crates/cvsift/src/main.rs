//! cvsift command-line entry point.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::error;

use cvsift::ai::FieldExtractor;
use cvsift::email::AttachmentCollector;
use cvsift::pipeline::Pipeline;
use cvsift::rank::HttpEmbedder;
use cvsift::storage::FileStorage;
use cvsift::Config;

#[derive(Parser)]
#[command(name = "cvsift", about = "Resume intake and ranking pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch resume attachments from unread mailbox messages
    Fetch,
    /// Rank stored resumes against a job description
    Rank {
        /// Path to a file holding the job description text
        #[arg(long)]
        job: PathBuf,
        /// Resume folder to scan (defaults to the configured folder)
        #[arg(long)]
        folder: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> cvsift::Result<()> {
    let config = Config::from_env()?;

    match cli.command {
        Commands::Fetch => {
            let storage = FileStorage::new(&config.resumes_dir);
            let collector = AttachmentCollector::new(config.mailbox, storage);
            let saved = collector.collect().await?;
            println!(
                "{} resume file(s) saved to {}",
                saved,
                config.resumes_dir.display()
            );
        }
        Commands::Rank { job, folder } => {
            let job_description = std::fs::read_to_string(&job)?;
            let folder = folder.unwrap_or_else(|| config.resumes_dir.clone());

            let extractor = FieldExtractor::new(config.extractor);
            let embedder = HttpEmbedder::new(config.embeddings);
            let pipeline = Pipeline::new(extractor, embedder);

            let records = pipeline.run(&folder, &job_description).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
