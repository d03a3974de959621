//! aicomm - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use aicomm::config::Settings;
use aicomm::llm;
use aicomm::pipeline::{self, RunOutcome, RunRequest};
use aicomm::ui::{Progress, TerminalPrompter};
use aicomm::MessageGenerator;

/// Generate a conventional commit message for your changes using AI.
#[derive(Parser, Debug)]
#[command(name = "aicomm")]
#[command(about = "Generate conventional commit messages for your changes using AI")]
#[command(version)]
struct Cli {
    /// Show the generated message without committing
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Show detailed logs and error chains
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Push to origin after committing
    #[arg(short = 'p', long)]
    push: bool,

    /// Stage all changes before generating the message
    #[arg(short = 's', long)]
    stage_all: bool,

    /// Interactively choose which files to stage
    #[arg(long, conflicts_with = "stage_all")]
    select: bool,

    /// Model to use (overrides .aicommrc)
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Skip AI and use the fallback message
    #[arg(long)]
    no_ai: bool,

    /// Print the diff sent to the model
    #[arg(long)]
    diff: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "ERROR".red().bold());
            if cli.verbose {
                eprintln!("\n{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<RunOutcome> {
    // Settings and credentials are checked before the workspace is touched.
    let settings = Settings::load_default()?.with_model_override(cli.model.clone());

    let generator = if cli.no_ai {
        MessageGenerator::without_client()
    } else {
        let client = llm::connect(&settings).await?;
        MessageGenerator::new(client)
    };

    let request = RunRequest {
        repo_path: PathBuf::from("."),
        dry_run: cli.dry_run,
        show_diff: cli.diff,
        no_ai: cli.no_ai,
        push: cli.push,
        stage_all: cli.stage_all,
        select: cli.select,
    };

    let outcome = pipeline::run(
        &request,
        &settings,
        &generator,
        &TerminalPrompter::new(),
        &Progress::terminal(),
    )
    .await?;

    Ok(outcome)
}

/// Logs go to stderr. `RUST_LOG` wins; otherwise `--verbose` enables debug output.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "aicomm=debug,warn".into()
        } else {
            "aicomm=warn".into()
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
