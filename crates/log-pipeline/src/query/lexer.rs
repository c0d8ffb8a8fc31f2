//! 쿼리 토크나이저와 텀 분해
//!
//! 쿼리 문자열을 공백 기준 토큰으로 나누고, 각 토큰을 `필드 연산자 값` 으로 분해합니다.
//! 작은따옴표나 큰따옴표로 감싼 구간은 공백이 있어도 하나의 토큰으로 유지되며,
//! 따옴표 문자 자체는 토큰화 과정에서 제거됩니다.

use std::fmt;

use crate::error::QueryError;

/// 텀 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `:` 포함 (와일드카드가 있으면 전체 일치)
    Contains,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
}

impl Operator {
    /// 연산자 기호를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => ":",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 분해된 텀 토큰
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTerm<'a> {
    /// 필드명 (검증 전)
    pub field: &'a str,
    /// 연산자
    pub op: Operator,
    /// 값 (따옴표 제거 후)
    pub value: &'a str,
}

/// 쿼리 문자열을 토큰으로 나눕니다.
///
/// 따옴표 구간의 내용은 토큰에 이어 붙이고 여닫는 따옴표는 버립니다.
/// (`"url:/a b"` -> `url:/a b`, `ua:*"Mozilla 5.0"*` -> `ua:*Mozilla 5.0*`)
/// 닫히지 않은 따옴표는 입력 끝까지 이어집니다.
pub fn tokenize(expr: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in expr.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None => current.push(ch),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// 토큰을 필드, 연산자, 값으로 분해합니다.
///
/// 왼쪽부터 위치를 훑으며 각 위치에서 두 글자 연산자(`>=`, `<=`, `!=`)를 먼저,
/// 그다음 한 글자 연산자(`:`, `=`, `>`, `<`)를 확인합니다. 처음 일치한 위치에서 나눕니다.
///
/// `:` 이외의 연산자 뒤에 연산자 문자가 이어지면 오타로 보고 거부합니다.
/// 단, 이어지는 문자가 `=` 또는 `~`로 시작하거나(`==`, `>==`, `=~`)
/// 연산자 문자 뒤에 숫자가 오는 경우(`=>400`, `=<2023-...`)만 해당합니다.
/// 그 외에는 값의 일부로 취급합니다(`url=<script>`의 값은 `<script>`).
pub fn split_term(token: &str) -> Result<RawTerm<'_>, QueryError> {
    let bytes = token.as_bytes();

    for i in 0..bytes.len() {
        let Some((op, len)) = operator_at(bytes, i) else {
            continue;
        };

        let field = &token[..i];
        let rest = &token[i + len..];

        if op != Operator::Contains {
            let after = rest.trim_start_matches(is_operator_char);
            let trailing = rest.len() - after.len();
            if trailing > 0 && is_misspelled_operator(rest, after) {
                return Err(QueryError::UnrecognizedOperator {
                    operator: token[i..i + len + trailing].to_owned(),
                    token: token.to_owned(),
                });
            }
        }

        return Ok(RawTerm {
            field,
            op,
            value: strip_quotes(rest),
        });
    }

    Err(QueryError::MissingOperator {
        token: token.to_owned(),
    })
}

fn operator_at(bytes: &[u8], i: usize) -> Option<(Operator, usize)> {
    match bytes.get(i..i + 2) {
        Some(b">=") => return Some((Operator::Gte, 2)),
        Some(b"<=") => return Some((Operator::Lte, 2)),
        Some(b"!=") => return Some((Operator::Ne, 2)),
        _ => {}
    }
    match bytes[i] {
        b':' => Some((Operator::Contains, 1)),
        b'=' => Some((Operator::Eq, 1)),
        b'>' => Some((Operator::Gt, 1)),
        b'<' => Some((Operator::Lt, 1)),
        _ => None,
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | '!' | '~')
}

fn is_misspelled_operator(rest: &str, after: &str) -> bool {
    rest.starts_with(['=', '~']) || after.starts_with(|c: char| c.is_ascii_digit())
}

/// 값을 감싼 따옴표 한 쌍을 제거합니다. 여는 따옴표만 있으면 그것만 제거합니다.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote) {
            return inner.strip_suffix(quote).unwrap_or(inner);
        }
    }
    value
}
