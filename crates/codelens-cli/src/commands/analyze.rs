//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::history::History;
use crate::output::{Formatter, Notice};
use codelens_analyzer::{AnalysisRequest, Analyzer};
use codelens_domain::settings::looks_like_math;
use codelens_llm::ModelProvider;
use std::fs;
use std::io::{self, Read};

/// Execute the analyze command.
pub async fn execute_analyze<M: ModelProvider>(
    args: AnalyzeArgs,
    analyzer: &Analyzer<M>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    // Read code from file or stdin
    let code = if let Some(file_path) = args.file {
        fs::read_to_string(file_path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    if code.trim().is_empty() {
        return Err(CliError::InvalidInput("No code provided".to_string()));
    }

    let language = args
        .language
        .unwrap_or_else(|| config.settings.language.clone());
    let mode = args.mode.map(Into::into).unwrap_or(config.settings.mode);

    if looks_like_math(&code, &language) {
        println!(
            "{}",
            formatter.info("Input looks like a math problem; solving it as one.")
        );
    }

    let request = AnalysisRequest {
        code: code.clone(),
        language: language.clone(),
        mode,
    };
    let result = analyzer.analyze_code(&request).await?;

    if result.is_mock {
        println!("{}", formatter.notice(&Notice::demo_analysis()));
    }
    println!("{}", formatter.analysis_report(&result));

    // Store the result so run and practice can pick it up later
    let mut history = History::load(config.settings.history_size);
    history.record(code, language, result);
    history.save()?;

    Ok(())
}
