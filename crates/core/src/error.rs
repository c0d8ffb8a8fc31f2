//! 에러 타입 -- 도메인별 에러 정의

/// logsift 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogsiftError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 입력 소스를 열거나 읽을 수 없음
    #[error("source '{label}' failed: {reason}")]
    Source { label: String, reason: String },

    /// 출력 싱크 쓰기 실패
    #[error("output failed: {0}")]
    Output(String),
}

/// 로그 라인 파싱 에러
///
/// 몇 개의 필드까지 인식했는지, 어느 필드에서 실패했는지를 담습니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// 빈 라인
    #[error("empty line (matched 0 fields)")]
    Empty,

    /// 필수 필드 부족
    #[error("matched {matched} of {required} required fields: {field} {reason}")]
    Incomplete {
        /// 인식한 필드 수
        matched: usize,
        /// 성공에 필요한 필드 수
        required: usize,
        /// 실패한 필드 이름
        field: &'static str,
        /// 실패 사유
        reason: String,
    },
}

impl ParseError {
    /// 인식한 필드 수를 반환합니다.
    pub fn matched(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Incomplete { matched, .. } => *matched,
        }
    }
}
