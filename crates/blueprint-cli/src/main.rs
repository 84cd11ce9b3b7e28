mod command;
mod config;
mod edit;
mod render;
mod repl;
mod tutorial;

#[cfg(test)]
mod test_util;

use anyhow::Result;
use clap::{Parser, Subcommand};

use blueprint_core::session::PlanSession;
use blueprint_gemini::GeminiGenerator;

use repl::Repl;
use tutorial::FileTutorialFlagStore;

#[derive(Parser)]
#[command(name = "blueprint", about = "AI-guided app planner: raw idea to validated MVP checklist")]
struct Cli {
    /// Gemini API key (overrides BLUEPRINT_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Gemini model name (overrides BLUEPRINT_MODEL env var)
    #[arg(long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a blueprint config file
    Init {
        /// Gemini API key to store
        #[arg(long)]
        api_key: String,
        /// Model name to store (defaults at run time when omitted)
        #[arg(long)]
        model: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Start an interactive planning session (the default)
    Run,
}

/// Execute the `blueprint init` command: write config file.
fn cmd_init(api_key: &str, model: Option<String>, force: bool) -> Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key: api_key.to_string(),
            model,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!();
    println!("Next: run `blueprint` to start a planning session.");

    Ok(())
}

/// Execute the `blueprint run` command: interactive planning session.
async fn cmd_run(cli_api_key: Option<&str>, cli_model: Option<&str>) -> Result<()> {
    let gemini_config = config::resolve(cli_api_key, cli_model)?;
    let generator = GeminiGenerator::new(gemini_config)?;
    let session = PlanSession::new(Box::new(generator));
    let tutorial = Box::new(FileTutorialFlagStore::default_location());

    Repl::new(session, tutorial).run().await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init {
            api_key,
            model,
            force,
        }) => cmd_init(&api_key, model, force)?,
        Some(Commands::Run) | None => {
            cmd_run(cli.api_key.as_deref(), cli.model.as_deref()).await?;
        }
    }

    Ok(())
}
