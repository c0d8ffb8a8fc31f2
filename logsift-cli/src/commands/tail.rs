//! Tail mode: follow one file until cancelled

use std::io::Write;

use tokio_util::sync::CancellationToken;

use logsift_pipeline::{JsonFraming, LineProcessor, RecordEncoder, Summary, TailFollower};

use super::RecordSink;
use crate::error::CliError;
use crate::settings::RunSettings;

/// Follow the single configured source, surviving truncation and rotation.
///
/// JSON output is written one object per line so each match can be consumed
/// as soon as it is flushed.
pub async fn execute(
    settings: &RunSettings,
    processor: LineProcessor,
    sink: RecordSink,
    diagnostics: &mut dyn Write,
    cancel: &CancellationToken,
) -> Result<Summary, CliError> {
    let Some(path) = settings.sources.first() else {
        return Err(CliError::Config(
            "--tail expects exactly one --log FILE (not multiple, not stdin)".to_owned(),
        ));
    };

    let mut follower = TailFollower::open(path, settings.start_position())
        .await?
        .with_poll_interval(settings.pipeline.poll_interval());
    let mut encoder =
        RecordEncoder::with_framing(sink, settings.pipeline.format, JsonFraming::Lines);

    let summary = follower
        .run(&processor, &mut encoder, diagnostics, cancel)
        .await?;
    encoder.finish()?;

    writeln!(diagnostics, "{path} {summary}")?;
    Ok(summary)
}
