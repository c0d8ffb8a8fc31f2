//! Command handlers -- one module per run mode

pub mod batch;
pub mod tail;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tokio_util::sync::CancellationToken;

use logsift_pipeline::{LineProcessor, RecordFilter, Summary};

use crate::error::CliError;
use crate::settings::RunSettings;

/// Buffered sink for matched records: a file from `--output`, otherwise stdout.
pub type RecordSink = BufWriter<Box<dyn Write>>;

/// Execute one invocation with resolved settings.
///
/// Diagnostics (skipped sources, strict warnings, per-source summaries) go to
/// `diagnostics`. `cancel` is only observed in tail mode.
pub async fn execute(
    settings: &RunSettings,
    diagnostics: &mut dyn Write,
    cancel: &CancellationToken,
) -> Result<Summary, CliError> {
    let filter = RecordFilter::build(
        settings.query.as_deref(),
        settings.search.as_deref(),
        settings.pipeline.case_insensitive,
        diagnostics,
    )?;
    let processor = LineProcessor::new(filter, settings.pipeline.strict);
    let sink = open_sink(settings.output.as_deref())?;

    if settings.tail {
        tail::execute(settings, processor, sink, diagnostics, cancel).await
    } else {
        batch::execute(settings, processor, sink, diagnostics).await
    }
}

fn open_sink(path: Option<&Path>) -> Result<RecordSink, CliError> {
    let inner: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                CliError::Config(format!(
                    "cannot open output file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Box::new(file)
        }
        None => Box::new(std::io::stdout()),
    };
    Ok(BufWriter::new(inner))
}
