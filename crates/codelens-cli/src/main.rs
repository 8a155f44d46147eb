//! CodeLens CLI - Debug code and screenshots with AI assistance.

use clap::Parser;
use codelens_analyzer::{Analyzer, SYSTEM_INSTRUCTION};
use codelens_cli::commands;
use codelens_cli::repl;
use codelens_cli::{Cli, CliError, Command, Config, Formatter};
use codelens_llm::GeminiClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> codelens_cli::Result<()> {
    // Diagnostics go to stderr so reports stay pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load or create config
    let mut config = Config::load().unwrap_or_else(|_| {
        let cfg = Config::default();
        cfg.save().ok();
        cfg
    });
    config.analyzer.validate().map_err(CliError::Config)?;

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(color_enabled);

    // Build the model client and analyzer
    let provider = GeminiClient::new(cli.api_key.unwrap_or_default())
        .with_model(config.analyzer.model.clone())
        .with_system_instruction(SYSTEM_INSTRUCTION);
    let analyzer = Analyzer::new(provider, config.analyzer.clone());

    // Handle commands
    match cli.command {
        None | Some(Command::Repl) => {
            // Enter REPL mode
            repl::run_repl(&analyzer, &mut config, &formatter).await?;
        }
        Some(Command::Analyze(args)) => {
            commands::execute_analyze(args, &analyzer, &config, &formatter).await?;
        }
        Some(Command::Extract(args)) => {
            commands::execute_extract(args, &analyzer, &config, &formatter).await?;
        }
        Some(Command::Run(args)) => {
            commands::execute_run(args, &analyzer, &config, &formatter).await?;
        }
        Some(Command::Practice(args)) => {
            commands::execute_practice(args, &analyzer, &config, &formatter).await?;
        }
        Some(Command::History(args)) => {
            commands::execute_history(args, &config, &formatter)?;
        }
    }

    Ok(())
}
