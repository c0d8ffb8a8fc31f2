//! 쿼리 엔진 -- `필드 연산자 값` 텀의 AND 결합
//!
//! [`Query`]는 쿼리 문자열을 한 번 컴파일한 뒤 여러 레코드에 대해 평가합니다.
//! 컴파일된 쿼리는 불변이며, 평가는 실패하지 않습니다.
//!
//! # 문법
//! ```text
//! status>=400 method:POST url:*login* userAgent:"*curl*"
//! ```
//! - 필드: `status`, `ip`, `method`, `url`, `timestamp`, `userAgent` (대소문자 무시)
//! - 연산자: `:` `=` `!=` `>` `<` `>=` `<=`
//! - 값의 와일드카드: `*` (임의 길이), `?` (한 문자)
//!
//! # 사용 예시
//! ```ignore
//! use logsift_pipeline::query::Query;
//!
//! let query = Query::compile("status>=500 method:GET", false)?;
//! if query.evaluate(&record) {
//!     // ...
//! }
//! ```

pub mod lexer;
pub mod wildcard;

pub use lexer::Operator;
pub use wildcard::{contains_text, wildcard_match};

use std::cmp::Ordering;

use logsift_core::pipeline::RecordMatcher;
use logsift_core::types::{parse_iso8601_utc, AccessRecord, RecordField};

use crate::error::QueryError;
use wildcard::has_wildcards;

/// 한 쿼리가 가질 수 있는 최대 텀 수
pub const MAX_QUERY_TERMS: usize = 16;

/// 미리 해석된 타입 값
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedValue {
    /// `status` 필드의 정수 값
    Integer(i64),
    /// `timestamp` 필드의 UTC 초 (`YYYY-MM-DDTHH:MM:SS` 형식일 때)
    Time(i64),
}

/// 쿼리의 단일 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// 대상 필드
    pub field: RecordField,
    /// 연산자
    pub op: Operator,
    /// 따옴표를 제거한 원본 값
    pub raw_value: String,
    /// 타입 비교가 가능할 때의 해석된 값
    pub typed: Option<TypedValue>,
}

impl Term {
    fn new(field: RecordField, op: Operator, raw_value: &str) -> Self {
        let typed = match field {
            RecordField::Status => raw_value.parse::<i64>().ok().map(TypedValue::Integer),
            RecordField::Timestamp => parse_iso8601_utc(raw_value).map(TypedValue::Time),
            _ => None,
        };
        Self {
            field,
            op,
            raw_value: raw_value.to_owned(),
            typed,
        }
    }

    fn evaluate(&self, record: &AccessRecord, case_insensitive: bool) -> bool {
        match self.field {
            RecordField::Status => {
                let status = record.status();
                match (self.op, self.typed) {
                    (Operator::Contains, _) => {
                        wildcard_match(&self.raw_value, &status.to_string(), case_insensitive)
                    }
                    (op, Some(TypedValue::Integer(value))) => {
                        compare(op, i64::from(status).cmp(&value))
                    }
                    (op, _) => string_compare(
                        op,
                        &self.raw_value,
                        &status.to_string(),
                        case_insensitive,
                    ),
                }
            }
            RecordField::Timestamp => match (self.op, self.typed, record.epoch()) {
                (op, Some(TypedValue::Time(value)), Some(epoch)) if op != Operator::Contains => {
                    compare(op, epoch.cmp(&value))
                }
                (op, _, _) => {
                    string_compare(op, &self.raw_value, record.timestamp(), case_insensitive)
                }
            },
            field => {
                let subject = record.text_field(field).unwrap_or_default();
                string_compare(self.op, &self.raw_value, subject, case_insensitive)
            }
        }
    }
}

/// 컴파일된 쿼리
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
    case_insensitive: bool,
}

impl Query {
    /// 쿼리 문자열을 컴파일합니다.
    ///
    /// 빈 문자열이나 공백만 있는 문자열은 모든 레코드에 매칭되는 쿼리가 됩니다.
    pub fn compile(expr: &str, case_insensitive: bool) -> Result<Self, QueryError> {
        let mut terms = Vec::new();

        for token in lexer::tokenize(expr) {
            if terms.len() == MAX_QUERY_TERMS {
                return Err(QueryError::TooManyTerms {
                    max: MAX_QUERY_TERMS,
                });
            }

            let raw = lexer::split_term(&token)?;
            let field =
                RecordField::from_str_loose(raw.field).ok_or_else(|| QueryError::UnknownField {
                    field: raw.field.to_owned(),
                    token: token.clone(),
                })?;
            terms.push(Term::new(field, raw.op, raw.value));
        }

        Ok(Self {
            terms,
            case_insensitive,
        })
    }

    /// 레코드가 모든 텀을 만족하는지 평가합니다.
    ///
    /// 첫 번째로 실패한 텀에서 평가를 중단합니다. 텀이 없으면 항상 true입니다.
    pub fn evaluate(&self, record: &AccessRecord) -> bool {
        self.terms
            .iter()
            .all(|term| term.evaluate(record, self.case_insensitive))
    }

    /// 컴파일된 텀 목록
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// 텀이 없는 쿼리인지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// 대소문자 무시 여부
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}

impl RecordMatcher for Query {
    fn matches(&self, record: &AccessRecord) -> bool {
        self.evaluate(record)
    }
}

/// 구조화되지 않은 부분 문자열 검색
///
/// 메서드, URL, user agent, 타임스탬프, IP 중 하나라도 `needle`을 포함하면 true입니다.
/// 빈 `needle`은 모든 레코드에 매칭됩니다.
pub fn substring_match(record: &AccessRecord, needle: &str, case_insensitive: bool) -> bool {
    [
        record.method(),
        record.url(),
        record.user_agent(),
        record.timestamp(),
        record.ip(),
    ]
    .into_iter()
    .any(|haystack| contains_text(haystack, needle, case_insensitive))
}

fn compare(op: Operator, ordering: Ordering) -> bool {
    match op {
        Operator::Contains | Operator::Eq => ordering == Ordering::Equal,
        Operator::Ne => ordering != Ordering::Equal,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Gte => ordering != Ordering::Less,
        Operator::Lte => ordering != Ordering::Greater,
    }
}

/// 타입 값이 없을 때의 문자열 비교. 대소 비교 연산자도 와일드카드 일치로 처리됩니다.
fn string_compare(op: Operator, pattern: &str, subject: &str, case_insensitive: bool) -> bool {
    match op {
        Operator::Contains if !has_wildcards(pattern) => {
            contains_text(subject, pattern, case_insensitive)
        }
        Operator::Ne => !wildcard_match(pattern, subject, case_insensitive),
        _ => wildcard_match(pattern, subject, case_insensitive),
    }
}
