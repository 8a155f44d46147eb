//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// CodeLens CLI - Debug code and screenshots with AI assistance.
#[derive(Debug, Parser)]
#[command(name = "codelens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Gemini API key (falls back to the environment)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze code for errors, corrections, and explanations
    Analyze(AnalyzeArgs),

    /// Extract code or a math problem from a screenshot
    Extract(ExtractArgs),

    /// Simulate running the tests of a stored correction
    Run(RunArgs),

    /// Generate a practice problem from a stored analysis
    Practice(PracticeArgs),

    /// Show or clear the analysis history
    History(HistoryArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Source file to analyze (reads stdin when omitted)
    pub file: Option<String>,

    /// Language of the source code
    #[arg(short, long)]
    pub language: Option<String>,

    /// Explanation depth
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Image file containing code or a math problem
    pub image: String,

    /// Analyze the extracted code immediately
    #[arg(long)]
    pub analyze: bool,

    /// Language for the follow-up analysis
    #[arg(short, long)]
    pub language: Option<String>,

    /// Explanation depth for the follow-up analysis
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// History entry to run, 1 being the most recent
    #[arg(short = 'n', long, default_value = "1")]
    pub entry: usize,
}

/// Arguments for the practice command.
#[derive(Debug, Parser)]
pub struct PracticeArgs {
    /// History entry to practice against, 1 being the most recent
    #[arg(short = 'n', long, default_value = "1")]
    pub entry: usize,
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Clear the stored history
    #[arg(long)]
    pub clear: bool,
}

/// Explanation mode argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ModeArg {
    /// Plain-language explanations for newcomers
    Beginner,
    /// Terse, technical explanations
    Advanced,
}

impl From<ModeArg> for codelens_domain::ExplanationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Beginner => codelens_domain::ExplanationMode::Beginner,
            ModeArg::Advanced => codelens_domain::ExplanationMode::Advanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_repl() {
        let cli = Cli::parse_from(["codelens"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_analyze_command() {
        let cli = Cli::parse_from([
            "codelens",
            "analyze",
            "script.R",
            "--language",
            "R",
            "--mode",
            "advanced",
        ]);
        match cli.command {
            Some(Command::Analyze(args)) => {
                assert_eq!(args.file.as_deref(), Some("script.R"));
                assert_eq!(args.language.as_deref(), Some("R"));
                assert!(matches!(args.mode, Some(ModeArg::Advanced)));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_extract_command_with_chained_analysis() {
        let cli = Cli::parse_from(["codelens", "extract", "shot.png", "--analyze"]);
        match cli.command {
            Some(Command::Extract(args)) => {
                assert_eq!(args.image, "shot.png");
                assert!(args.analyze);
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_history_clear_flag() {
        let cli = Cli::parse_from(["codelens", "history", "--clear"]);
        match cli.command {
            Some(Command::History(args)) => assert!(args.clear),
            _ => panic!("Expected History command"),
        }
    }

    #[test]
    fn test_mode_conversion() {
        let mode: codelens_domain::ExplanationMode = ModeArg::Beginner.into();
        assert!(matches!(mode, codelens_domain::ExplanationMode::Beginner));
    }
}
