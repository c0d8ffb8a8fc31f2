//! 파이프라인 trait -- 모듈 확장 포인트 정의

use crate::error::ParseError;
use crate::types::AccessRecord;

/// 로그 라인 파서 trait
///
/// 한 줄의 텍스트를 레코드로 변환합니다. 어떤 입력에도 패닉하지 않아야 합니다.
pub trait LineParser: Send + Sync {
    /// 지원하는 로그 형식 이름
    fn format_name(&self) -> &str;

    /// 줄바꿈이 제거된 한 줄을 레코드로 파싱
    fn parse(&self, line: &str) -> Result<AccessRecord, ParseError>;
}

/// 레코드 필터 trait
///
/// 컴파일된 쿼리나 단순 검색어처럼 레코드를 선별하는 로직이 구현합니다.
/// 평가는 실패하지 않습니다.
pub trait RecordMatcher: Send + Sync {
    /// 레코드가 조건을 만족하면 true
    fn matches(&self, record: &AccessRecord) -> bool;
}
