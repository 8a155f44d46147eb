//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::history::History;
use crate::output::Formatter;
use codelens_analyzer::Analyzer;
use codelens_llm::ModelProvider;

/// Execute the run command: simulate the stored correction's tests.
pub async fn execute_run<M: ModelProvider>(
    args: RunArgs,
    analyzer: &Analyzer<M>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let history = History::load(config.settings.history_size);
    let entry = history.get(args.entry).ok_or(CliError::NoAnalysis)?;

    let correction = entry.result.correction.as_ref().ok_or_else(|| {
        CliError::InvalidInput("The stored analysis has no correction to run".to_string())
    })?;

    let result = analyzer
        .run_tests(&correction.corrected_code, &correction.tests)
        .await?;

    println!("{}", formatter.execution_report(&result));
    Ok(())
}
