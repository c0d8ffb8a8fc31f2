//! 로그 파싱 모듈 -- Apache/Nginx combined 형식 파서
//!
//! 각 파서는 core의 [`LineParser`](logsift_core::pipeline::LineParser) trait을 구현하며,
//! 스트림 처리기와 tail 엔진은 trait 객체로 파서를 받습니다.
//!
//! # 지원 형식
//! - combined / common 로그 ([`CombinedLogParser`])

pub mod combined;

pub use combined::{CombinedLogParser, REQUIRED_FIELDS};
