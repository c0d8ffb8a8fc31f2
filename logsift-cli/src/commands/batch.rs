//! Batch mode: read every source once, in order, into a single output stream

use std::io::Write;

use tokio::io::BufReader;
use tracing::{debug, info};

use logsift_pipeline::{LineProcessor, LogPipelineError, RecordEncoder, StreamProcessor, Summary};

use super::RecordSink;
use crate::error::CliError;
use crate::settings::{RunSettings, STDIN_LABEL};

/// Process all sources and return the combined statistics.
///
/// A source that cannot be opened or read is reported on `diagnostics` and
/// skipped; the remaining sources still run and the exit status stays 0.
pub async fn execute(
    settings: &RunSettings,
    processor: LineProcessor,
    sink: RecordSink,
    diagnostics: &mut dyn Write,
) -> Result<Summary, CliError> {
    let stream = StreamProcessor::new(processor);
    let mut encoder = RecordEncoder::new(sink, settings.pipeline.format);
    let mut total = Summary::default();

    encoder.begin()?;

    for source in &settings.sources {
        let result = if source == STDIN_LABEL {
            let reader = BufReader::new(tokio::io::stdin());
            stream.run(reader, STDIN_LABEL, &mut encoder, diagnostics).await
        } else {
            match tokio::fs::File::open(source).await {
                Ok(file) => {
                    stream
                        .run(BufReader::new(file), source, &mut encoder, diagnostics)
                        .await
                }
                Err(e) => {
                    debug!(source = %source, error = %e, "skipping source");
                    writeln!(diagnostics, "{source}: {e}")?;
                    continue;
                }
            }
        };

        match result {
            Ok(summary) => total.merge(&summary),
            // the stream has already reported the error and its partial summary
            Err(LogPipelineError::Source { label, reason }) => {
                debug!(source = %label, error = %reason, "source aborted");
            }
            Err(e) => return Err(e.into()),
        }
    }

    encoder.finish()?;

    info!(
        sources = settings.sources.len(),
        total = total.total,
        matched = total.matched,
        failed = total.failed,
        "batch complete"
    );
    Ok(total)
}
