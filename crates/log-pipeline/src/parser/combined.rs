//! Apache/Nginx combined 로그 파서
//!
//! # combined 로그 형식
//! ```text
//! IP - - [TIMESTAMP] "METHOD URL PROTOCOL" STATUS SIZE "REFERRER" "USERAGENT"
//! ```
//!
//! 정규식 대신 왼쪽에서 오른쪽으로 진행하는 토큰 스캐너로 구현되어,
//! 실패 시 몇 개의 필드를 인식했는지와 어느 필드에서 멈췄는지를 알 수 있습니다.
//!
//! # 사용 예시
//! ```ignore
//! use logsift_pipeline::parser::CombinedLogParser;
//! use logsift_core::pipeline::LineParser;
//!
//! let parser = CombinedLogParser::new();
//! let record = parser.parse(r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 512 "-" "curl/8.0""#)?;
//! assert_eq!(record.status(), 200);
//! ```

use logsift_core::error::ParseError;
use logsift_core::pipeline::LineParser;
use logsift_core::types::AccessRecord;

/// 파싱 성공에 필요한 필드 수 (IP, 타임스탬프, 메서드, URL, 프로토콜, 상태 코드)
pub const REQUIRED_FIELDS: usize = 6;

/// combined 로그 파서
///
/// core의 [`LineParser`] trait을 구현합니다. 관대한 정책을 따릅니다:
/// 필수 6개 필드만 인식되면 성공하고, user agent는 최선 노력으로 추출합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombinedLogParser;

impl CombinedLogParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    fn parse_line(&self, line: &str) -> Result<AccessRecord, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let mut scanner = Scanner::new(line);
        let mut matched = 0;

        let ip = scanner.token().ok_or(ParseError::Empty)?;
        matched += 1;

        let timestamp = scanner
            .bracketed()
            .ok_or_else(|| incomplete(matched, "timestamp", "missing [...] block"))?;
        matched += 1;

        let request = scanner
            .quoted()
            .ok_or_else(|| incomplete(matched, "request", "missing quoted request"))?;
        let mut request_parts = request.split_whitespace();

        let method = request_parts
            .next()
            .ok_or_else(|| incomplete(matched, "method", "empty request"))?;
        matched += 1;

        let url = request_parts
            .next()
            .ok_or_else(|| incomplete(matched, "url", "missing from request"))?;
        matched += 1;

        request_parts
            .next()
            .ok_or_else(|| incomplete(matched, "protocol", "missing from request"))?;
        matched += 1;

        let status_token = scanner
            .token()
            .ok_or_else(|| incomplete(matched, "status", "missing"))?;
        let status: u16 = status_token.parse().map_err(|_| {
            incomplete(
                matched,
                "status",
                &format!("invalid status code '{status_token}'"),
            )
        })?;

        // 이후 필드(size, referrer, user agent)는 실패해도 레코드를 만듭니다.
        let _size = scanner.unquoted_token();
        let user_agent = match scanner.quoted() {
            Some(_referrer) => scanner.quoted_or_rest().unwrap_or(""),
            None => "",
        };

        Ok(AccessRecord::new(
            timestamp, ip, method, url, status, user_agent,
        ))
    }
}

impl LineParser for CombinedLogParser {
    fn format_name(&self) -> &str {
        "combined"
    }

    fn parse(&self, line: &str) -> Result<AccessRecord, ParseError> {
        self.parse_line(line)
    }
}

fn incomplete(matched: usize, field: &'static str, reason: &str) -> ParseError {
    ParseError::Incomplete {
        matched,
        required: REQUIRED_FIELDS,
        field,
        reason: reason.to_owned(),
    }
}

/// 한 줄 위를 움직이는 위치 기반 스캐너
///
/// 모든 구분자가 ASCII이므로 `find`로 얻은 위치는 항상 문자 경계입니다.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// 공백으로 구분된 다음 토큰
    fn token(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += end;
        Some(&rest[..end])
    }

    /// 따옴표로 시작하지 않는 다음 토큰 (size 필드용)
    fn unquoted_token(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        if self.rest().starts_with('"') {
            return None;
        }
        self.token()
    }

    /// 다음 `[` 부터 `]` 까지의 내용. 사이의 ident/user 토큰은 건너뜁니다.
    fn bracketed(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let open = rest.find('[')?;
        let body = &rest[open + 1..];
        let close = body.find(']')?;
        self.pos += open + 1 + close + 1;
        Some(&body[..close])
    }

    /// 공백 다음에 바로 오는 `"..."` 문자열. `\"` 이스케이프를 건너뜁니다.
    fn quoted(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let body = self.rest().strip_prefix('"')?;
        let close = find_closing_quote(body)?;
        self.pos += 1 + close + 1;
        Some(&body[..close])
    }

    /// `quoted`와 같지만 닫는 따옴표가 없으면 줄의 나머지를 반환합니다.
    fn quoted_or_rest(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let body = self.rest().strip_prefix('"')?;
        match find_closing_quote(body) {
            Some(close) => {
                self.pos += 1 + close + 1;
                Some(&body[..close])
            }
            None => {
                self.pos = self.input.len();
                Some(body)
            }
        }
    }
}

fn find_closing_quote(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
