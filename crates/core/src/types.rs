//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 파서, 쿼리 엔진, 출력 인코더가 공유하는 접근 로그 레코드를 정의합니다.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// timestamp 필드 최대 길이 (바이트)
pub const MAX_TIMESTAMP_LEN: usize = 63;
/// ip 필드 최대 길이 (바이트)
pub const MAX_IP_LEN: usize = 63;
/// method 필드 최대 길이 (바이트)
pub const MAX_METHOD_LEN: usize = 15;
/// url 필드 최대 길이 (바이트)
pub const MAX_URL_LEN: usize = 1023;
/// user agent 필드 최대 길이 (바이트)
pub const MAX_USER_AGENT_LEN: usize = 1023;

/// ISO-8601 형식 (`YYYY-MM-DDTHH:MM:SS`)
const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// 접근 로그 레코드
///
/// combined 로그 한 줄을 파싱한 결과입니다. 생성 이후에는 변경되지 않으며,
/// 모든 문자열 필드는 최대 길이를 넘으면 조용히 잘립니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRecord {
    /// 로그에 기록된 원본 타임스탬프
    timestamp: String,
    /// UTC 초 단위 시각 (ISO-8601 형태의 타임스탬프일 때만)
    #[serde(skip)]
    epoch: Option<i64>,
    /// 클라이언트 IP
    ip: String,
    /// HTTP 메서드
    method: String,
    /// 요청 URL
    url: String,
    /// HTTP 상태 코드
    status: u16,
    /// User-Agent 헤더
    user_agent: String,
}

impl AccessRecord {
    /// 새 레코드를 생성합니다.
    ///
    /// 각 문자열 필드는 UTF-8 문자 경계에서 최대 길이로 잘립니다.
    /// `epoch`는 타임스탬프가 ISO-8601 형태일 때만 채워집니다.
    pub fn new(
        timestamp: &str,
        ip: &str,
        method: &str,
        url: &str,
        status: u16,
        user_agent: &str,
    ) -> Self {
        let timestamp = bounded(timestamp, MAX_TIMESTAMP_LEN);
        let epoch = parse_record_epoch(&timestamp);
        Self {
            timestamp,
            epoch,
            ip: bounded(ip, MAX_IP_LEN),
            method: bounded(method, MAX_METHOD_LEN),
            url: bounded(url, MAX_URL_LEN),
            status,
            user_agent: bounded(user_agent, MAX_USER_AGENT_LEN),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn epoch(&self) -> Option<i64> {
        self.epoch
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 문자열 필드 값을 반환합니다. `status`는 `None`입니다.
    pub fn text_field(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Ip => Some(&self.ip),
            RecordField::Method => Some(&self.method),
            RecordField::Url => Some(&self.url),
            RecordField::Timestamp => Some(&self.timestamp),
            RecordField::UserAgent => Some(&self.user_agent),
            RecordField::Status => None,
        }
    }
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {} -> {}",
            self.timestamp, self.ip, self.method, self.url, self.status,
        )
    }
}

/// 쿼리 가능한 레코드 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    /// HTTP 상태 코드
    Status,
    /// 클라이언트 IP
    Ip,
    /// HTTP 메서드
    Method,
    /// 요청 URL
    Url,
    /// 원본 타임스탬프
    Timestamp,
    /// User-Agent
    UserAgent,
}

impl RecordField {
    /// 모든 필드 (레코드 순서)
    pub const ALL: [RecordField; 6] = [
        Self::Timestamp,
        Self::Ip,
        Self::Method,
        Self::Url,
        Self::Status,
        Self::UserAgent,
    ];

    /// 문자열에서 필드를 찾습니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "status" => Some(Self::Status),
            "ip" => Some(Self::Ip),
            "method" => Some(Self::Method),
            "url" => Some(Self::Url),
            "timestamp" => Some(Self::Timestamp),
            "useragent" => Some(Self::UserAgent),
            _ => None,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => write!(f, "status"),
            Self::Ip => write!(f, "ip"),
            Self::Method => write!(f, "method"),
            Self::Url => write!(f, "url"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::UserAgent => write!(f, "userAgent"),
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SS` 형식만 UTC 초로 변환합니다.
///
/// 다른 형태(타임존 접미사, 소수 초, combined 로그 형식 등)는 `None`입니다.
pub fn parse_iso8601_utc(value: &str) -> Option<i64> {
    if value.len() != 19 {
        return None;
    }
    NaiveDateTime::parse_from_str(value, ISO8601_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// 레코드 타임스탬프의 epoch를 최선 노력으로 계산합니다.
///
/// 정확한 ISO-8601 형태 외에 RFC 3339 (`Z`, `+09:00` 접미사)도 허용합니다.
// TODO: combined 로그 형식(`%d/%b/%Y:%H:%M:%S %z`)도 변환해서 timestamp 비교 연산이 동작하도록 확장
fn parse_record_epoch(timestamp: &str) -> Option<i64> {
    parse_iso8601_utc(timestamp).or_else(|| {
        DateTime::parse_from_rfc3339(timestamp)
            .ok()
            .map(|dt| dt.timestamp())
    })
}

/// 문자열을 UTF-8 문자 경계에서 최대 `max` 바이트로 자릅니다.
fn bounded(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_owned();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_owned()
}
