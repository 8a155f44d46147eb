//! Practice command implementation.

use crate::cli::PracticeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::history::History;
use crate::output::Formatter;
use codelens_analyzer::{Analyzer, PracticeRequest};
use codelens_llm::ModelProvider;

/// Execute the practice command: generate a problem from a stored analysis.
pub async fn execute_practice<M: ModelProvider>(
    args: PracticeArgs,
    analyzer: &Analyzer<M>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let history = History::load(config.settings.history_size);
    let entry = history.get(args.entry).ok_or(CliError::NoAnalysis)?;

    let request = PracticeRequest::from_analysis(
        &entry.result,
        &entry.code,
        config.settings.language.clone(),
        config.settings.mode,
        config.analyzer.context_snippet_limit,
    );
    let set = analyzer.generate_practice(&request).await?;

    if let Some(problem) = set.primary() {
        println!("{}", formatter.practice_problem(problem));
    }
    Ok(())
}
