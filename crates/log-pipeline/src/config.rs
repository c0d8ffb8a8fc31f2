//! 로그 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`LogsiftConfig`](logsift_core::config::LogsiftConfig)를
//! 기반으로 스트림 처리기와 tail 엔진이 사용하는 타입이 지정된 설정을 제공합니다.
//! 문자열 설정값(출력 형식 등)은 이 단계에서 열거형으로 변환됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use logsift_core::config::LogsiftConfig;
//! use logsift_pipeline::config::PipelineConfig;
//!
//! let core_config = LogsiftConfig::default();
//! let config = PipelineConfig::from_core(&core_config)?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;
use crate::output::OutputFormat;

/// tail 폴링 간격 하한 (밀리초)
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
/// tail 폴링 간격 상한 (밀리초)
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// 로그 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 레코드 출력 형식
    pub format: OutputFormat,
    /// 파싱 실패 라인을 진단 채널로 보고
    pub strict: bool,
    /// 대소문자 구분 없는 매칭
    pub case_insensitive: bool,
    /// tail 모드에서 새 데이터가 없을 때 대기 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// tail 모드에서 파일 처음부터 읽기
    pub from_start: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            strict: false,
            case_insensitive: false,
            poll_interval_ms: 200,
            from_start: false,
        }
    }
}

impl PipelineConfig {
    /// core 설정에서 파이프라인 설정을 생성합니다.
    ///
    /// 출력 형식 문자열이 잘못된 경우 `Config` 에러를 반환합니다.
    pub fn from_core(core: &logsift_core::config::LogsiftConfig) -> Result<Self, LogPipelineError> {
        let config = Self {
            format: core.output.format.parse()?,
            strict: core.output.strict,
            case_insensitive: core.output.case_insensitive,
            poll_interval_ms: core.tail.poll_interval_ms,
            from_start: core.tail.from_start,
        };
        config.validate()?;
        Ok(config)
    }

    /// 폴링 간격을 `Duration`으로 반환합니다.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(LogPipelineError::Config {
                field: "poll_interval_ms".to_owned(),
                reason: format!("must be {MIN_POLL_INTERVAL_MS}-{MAX_POLL_INTERVAL_MS}"),
            });
        }
        Ok(())
    }
}

/// 파이프라인 설정 빌더
///
/// CLI 플래그처럼 일부 값만 덮어쓸 때 사용합니다.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 빌더를 시작합니다.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// 출력 형식을 설정합니다.
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// strict 모드를 설정합니다.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// 대소문자 무시 여부를 설정합니다.
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.config.case_insensitive = case_insensitive;
        self
    }

    /// 폴링 간격(밀리초)을 설정합니다.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// tail 시작 위치를 설정합니다.
    pub fn from_start(mut self, from_start: bool) -> Self {
        self.config.from_start = from_start;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
