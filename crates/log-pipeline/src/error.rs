//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 로그 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for LogsiftError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 라인 단위 파싱 실패는 core의 [`ParseError`](logsift_core::error::ParseError)로 표현되며
//! 파이프라인을 중단시키지 않습니다.

use logsift_core::error::{ConfigError, LogsiftError, PipelineError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 입력 소스 에러 (열기, 읽기, stat 등)
    #[error("source error: {label}: {reason}")]
    Source {
        /// 소스 레이블 (파일 경로 또는 `-`)
        label: String,
        /// 에러 사유
        reason: String,
    },

    /// 출력 싱크 쓰기 실패
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogPipelineError> for LogsiftError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Source { label, reason } => {
                PipelineError::Source { label, reason }.into()
            }
            LogPipelineError::Output(e) => PipelineError::Output(e.to_string()).into(),
            LogPipelineError::Config { field, reason } => {
                ConfigError::InvalidValue { field, reason }.into()
            }
            LogPipelineError::Io(e) => LogsiftError::Io(e),
        }
    }
}

/// 쿼리 컴파일 에러
///
/// 각 변형은 문제가 된 토큰이나 필드를 담습니다.
/// 컴파일 실패는 실행을 중단시키지 않으므로 [`LogPipelineError`]로 감싸지 않습니다.
/// 호출자는 [`RecordFilter::build`](crate::stream::RecordFilter::build)처럼
/// 부분 문자열 검색으로 대체합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// 알 수 없는 필드명
    #[error("unknown field '{field}' in term '{token}'")]
    UnknownField {
        /// 필드명
        field: String,
        /// 원본 토큰
        token: String,
    },

    /// 연산자를 찾을 수 없음
    #[error("no operator in term '{token}' (expected one of : = != > < >= <=)")]
    MissingOperator {
        /// 원본 토큰
        token: String,
    },

    /// 지원하지 않는 연산자
    #[error("unrecognized operator '{operator}' in term '{token}'")]
    UnrecognizedOperator {
        /// 연산자 문자열
        operator: String,
        /// 원본 토큰
        token: String,
    },

    /// 텀 개수 초과
    #[error("too many terms: at most {max} terms are supported")]
    TooManyTerms {
        /// 최대 텀 수
        max: usize,
    },
}
