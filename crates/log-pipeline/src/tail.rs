//! tail 엔진 -- 단일 파일 추적과 로테이션 감지
//!
//! `tail -f`와 유사하게 파일 끝에 추가되는 라인을 따라가며 처리합니다.
//! [`TailFollower::step`]은 상태 전이를 정확히 하나씩 수행하고,
//! [`TailFollower::run`]은 취소될 때까지 `step`을 반복합니다.
//!
//! # 상태 전이
//! ```text
//! Open -> Reading
//! Reading -> Reading    (완전한 라인 처리)
//!         -> Reopening  (크기 < 오프셋: truncation, dev/ino 변경: 교체)
//!         -> Waiting    (새 데이터 없음, stat 실패)
//! Waiting -> Reading | Reopening (재열기 대기 중일 때)
//! Reopening -> Reading  (성공: 시작 위치 정책 재적용)
//!           -> Waiting  (실패: 재열기 대기)
//! ```
//!
//! # 로테이션 감지
//! - 파일 크기가 읽은 오프셋보다 작아지면 truncation
//! - 같은 경로의 장치/inode가 바뀌면 교체 (logrotate 등)
//!
//! 폴링 기반의 근사치입니다. rename 이후 다음 폴링 전까지 옛 파일에 추가된 내용은 읽지 않습니다.

use std::io::{SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::LogPipelineError;
use crate::output::RecordEncoder;
use crate::stream::{trim_line_end, LineOutcome, LineProcessor, Summary};

/// 기본 폴링 간격
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 파일을 열었을 때의 읽기 시작 위치
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartPosition {
    /// 파일 처음부터
    Beginning,
    /// 파일 끝부터 (새로 추가되는 라인만)
    #[default]
    End,
}

/// tail 엔진 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// 파일을 열고 시작 위치를 적용한 직후
    Open,
    /// 라인을 읽는 중
    Reading,
    /// 새 데이터를 기다리는 중
    Waiting,
    /// 파일을 다시 여는 중
    Reopening,
}

/// 추적 중인 파일의 식별 정보와 읽기 위치
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TailCursor {
    /// 장치 번호 (Unix 외 플랫폼에서는 0)
    pub dev: u64,
    /// inode 번호 (Unix 외 플랫폼에서는 0)
    pub ino: u64,
    /// 마지막으로 확인한 파일 크기
    pub size: u64,
    /// 현재 읽기 오프셋
    pub offset: u64,
}

/// 단일 파일 추적기
pub struct TailFollower {
    path: PathBuf,
    start: StartPosition,
    poll_interval: Duration,
    reader: Option<BufReader<File>>,
    cursor: TailCursor,
    state: TailState,
    /// 개행이 아직 도착하지 않은 라인 조각
    pending: Vec<u8>,
    reopen_pending: bool,
    summary: Summary,
}

impl TailFollower {
    /// 파일을 열고 시작 위치를 적용합니다.
    pub async fn open(
        path: impl AsRef<Path>,
        start: StartPosition,
    ) -> Result<Self, LogPipelineError> {
        let path = path.as_ref().to_path_buf();
        let (reader, cursor) =
            open_at(&path, start)
                .await
                .map_err(|e| LogPipelineError::Source {
                    label: path.display().to_string(),
                    reason: e.to_string(),
                })?;

        debug!(path = %path.display(), ?start, offset = cursor.offset, "tail opened");

        Ok(Self {
            path,
            start,
            poll_interval: DEFAULT_POLL_INTERVAL,
            reader: Some(reader),
            cursor,
            state: TailState::Open,
            pending: Vec::new(),
            reopen_pending: false,
            summary: Summary::default(),
        })
    }

    /// 폴링 간격을 설정합니다.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// 상태 전이를 하나 수행하고 새 상태를 반환합니다.
    pub async fn step<W: Write>(
        &mut self,
        processor: &LineProcessor,
        encoder: &mut RecordEncoder<W>,
        diagnostics: &mut dyn Write,
    ) -> Result<TailState, LogPipelineError> {
        let current = self.state;
        self.state = match current {
            TailState::Open => TailState::Reading,
            TailState::Reading => self.read_step(processor, encoder, diagnostics).await?,
            TailState::Waiting if self.reopen_pending => TailState::Reopening,
            TailState::Waiting => TailState::Reading,
            TailState::Reopening => self.reopen_step().await,
        };
        Ok(self.state)
    }

    async fn read_step<W: Write>(
        &mut self,
        processor: &LineProcessor,
        encoder: &mut RecordEncoder<W>,
        diagnostics: &mut dyn Write,
    ) -> Result<TailState, LogPipelineError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(TailState::Reopening);
        };

        match reader.read_until(b'\n', &mut self.pending).await {
            Ok(read) => self.cursor.offset += read as u64,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "tail read failed, reopening");
                self.reopen_pending = true;
                return Ok(TailState::Waiting);
            }
        }

        if !self.pending.ends_with(b"\n") {
            return Ok(self.check_rotation().await);
        }

        let line = String::from_utf8_lossy(trim_line_end(&self.pending)).into_owned();
        self.pending.clear();

        let outcome = processor.process(&line, encoder)?;
        if let (true, LineOutcome::Failed(err)) = (processor.strict(), &outcome) {
            writeln!(diagnostics, "[tail warn] {err}")?;
            writeln!(diagnostics, "  >> {line}")?;
        }
        if outcome == LineOutcome::Matched {
            encoder.flush()?;
        }
        self.summary.record(&outcome);

        Ok(TailState::Reading)
    }

    /// 새 데이터가 없을 때 경로를 stat하여 truncation과 교체를 감지합니다.
    async fn check_rotation(&mut self) -> TailState {
        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "tail stat failed");
                return TailState::Waiting;
            }
        };

        let (dev, ino) = file_identity(&meta);
        if meta.len() < self.cursor.offset {
            info!(
                path = %self.path.display(),
                size = meta.len(),
                offset = self.cursor.offset,
                "file truncated, reopening"
            );
            return TailState::Reopening;
        }
        if (dev, ino) != (self.cursor.dev, self.cursor.ino) {
            info!(path = %self.path.display(), "file replaced, reopening");
            return TailState::Reopening;
        }

        self.cursor.size = meta.len();
        TailState::Waiting
    }

    async fn reopen_step(&mut self) -> TailState {
        self.reader = None;

        match open_at(&self.path, self.start).await {
            Ok((reader, cursor)) => {
                debug!(path = %self.path.display(), offset = cursor.offset, "tail reopened");
                self.reader = Some(reader);
                self.cursor = cursor;
                self.pending.clear();
                self.reopen_pending = false;
                TailState::Reading
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "tail reopen failed, will retry");
                self.reopen_pending = true;
                TailState::Waiting
            }
        }
    }

    /// 취소될 때까지 파일을 추적하고 통계를 반환합니다.
    ///
    /// 취소 여부는 `Waiting` 상태에서 대기할 때마다 확인합니다.
    pub async fn run<W: Write>(
        &mut self,
        processor: &LineProcessor,
        encoder: &mut RecordEncoder<W>,
        diagnostics: &mut dyn Write,
        cancel: &CancellationToken,
    ) -> Result<Summary, LogPipelineError> {
        info!(path = %self.path.display(), "following file");

        loop {
            if self.state == TailState::Waiting {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
            self.step(processor, encoder, diagnostics).await?;
        }

        encoder.flush()?;
        info!(
            path = %self.path.display(),
            total = self.summary.total,
            matched = self.summary.matched,
            "tail stopped"
        );
        Ok(self.summary)
    }

    /// 현재 상태
    pub fn state(&self) -> TailState {
        self.state
    }

    /// 현재 커서
    pub fn cursor(&self) -> TailCursor {
        self.cursor
    }

    /// 지금까지의 처리 통계
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// 추적 중인 경로
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn open_at(
    path: &Path,
    start: StartPosition,
) -> std::io::Result<(BufReader<File>, TailCursor)> {
    let mut file = File::open(path).await?;
    let meta = file.metadata().await?;
    let offset = match start {
        StartPosition::Beginning => 0,
        StartPosition::End => file.seek(SeekFrom::End(0)).await?,
    };
    let (dev, ino) = file_identity(&meta);
    let cursor = TailCursor {
        dev,
        ino,
        size: meta.len(),
        offset,
    };
    Ok((BufReader::new(file), cursor))
}

#[cfg(unix)]
fn file_identity(meta: &std::fs::Metadata) -> (u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (meta.dev(), meta.ino())
}

#[cfg(not(unix))]
fn file_identity(_meta: &std::fs::Metadata) -> (u64, u64) {
    (0, 0)
}
