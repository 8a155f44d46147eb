//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::history::History;
use crate::output::{Formatter, Notice};
use codelens_analyzer::{AnalysisRequest, Analyzer};
use codelens_llm::ModelProvider;
use std::fs;
use std::path::Path;

/// Execute the extract command.
pub async fn execute_extract<M: ModelProvider>(
    args: ExtractArgs,
    analyzer: &Analyzer<M>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let bytes = fs::read(&args.image)?;
    let mime_type = mime_for(&args.image)?;

    let extraction = analyzer.extract_code(&bytes, mime_type).await?;

    if extraction.is_mock {
        println!("{}", formatter.notice(&Notice::demo_extraction()));
    } else if extraction.confidence < config.analyzer.low_confidence_threshold {
        println!("{}", formatter.notice(&Notice::low_confidence()));
    }
    println!("{}", formatter.extraction(&extraction));

    if args.analyze {
        if extraction.text.trim().is_empty() {
            return Err(CliError::InvalidInput(
                "No code was extracted to analyze".to_string(),
            ));
        }

        // An explicit flag wins; otherwise adopt the detected language
        let language = args
            .language
            .clone()
            .or_else(|| {
                let detected = extraction.language.clone();
                (!detected.is_empty() && detected != "unknown").then_some(detected)
            })
            .unwrap_or_else(|| config.settings.language.clone());
        let mode = args.mode.map(Into::into).unwrap_or(config.settings.mode);

        let request = AnalysisRequest {
            code: extraction.text.clone(),
            language: language.clone(),
            mode,
        };
        let result = analyzer.analyze_code(&request).await?;

        if result.is_mock {
            println!("{}", formatter.notice(&Notice::demo_analysis()));
        }
        println!("{}", formatter.analysis_report(&result));

        let mut history = History::load(config.settings.history_size);
        history.record(extraction.text.clone(), language, result);
        history.save()?;
    }

    Ok(())
}

/// Map an image path to its MIME type by extension.
pub(crate) fn mime_for(path: &str) -> Result<&'static str> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "bmp" => Ok("image/bmp"),
        _ => Err(CliError::InvalidInput(format!(
            "Unsupported image type '{}'. Use png, jpg, gif, webp, or bmp",
            path
        ))),
    }
}
