#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: Apache/Nginx combined 로그 라인 파서
//! - [`query`]: `필드 연산자 값` 쿼리 DSL 컴파일러와 평가기, 와일드카드 매칭
//! - [`output`]: text / JSON / CSV 레코드 인코더
//! - [`stream`]: 배치 모드 스트림 처리기, 레코드 필터, 라인 처리기
//! - [`tail`]: 단일 파일 추적 엔진 (truncation, 교체 감지)
//! - [`config`]: 파이프라인 설정 (core 설정 변환)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! source (file/stdin) -> CombinedLogParser -> RecordFilter -> RecordEncoder -> sink
//!                             |                  |                |
//!                       ParseError 집계     Query / Search    text/json/csv
//!
//! TailFollower: Open -> Reading <-> Waiting, Reopening (로테이션)
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod query;
pub mod stream;
pub mod tail;

// --- 주요 타입 re-export ---

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::{LogPipelineError, QueryError};

// 파서
pub use parser::CombinedLogParser;

// 쿼리
pub use query::{substring_match, wildcard_match, Query, Term, MAX_QUERY_TERMS};

// 출력
pub use output::{JsonFraming, OutputFormat, RecordEncoder};

// 처리기
pub use stream::{LineProcessor, RecordFilter, StreamProcessor, Summary};

// tail
pub use tail::{StartPosition, TailCursor, TailFollower, TailState};
