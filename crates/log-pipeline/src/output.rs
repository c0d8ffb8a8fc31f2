//! 레코드 출력 인코더 -- text, JSON, CSV
//!
//! [`RecordEncoder`]는 출력 싱크와 프레이밍 상태(첫 레코드 여부)를 소유합니다.
//! 하나의 인코더가 배치 실행 전체(여러 소스)에 걸쳐 사용되므로
//! JSON 배열은 소스 수와 관계없이 하나만 만들어집니다.
//!
//! # 형식
//! - text: `[ts] ip method url -> status`
//! - csv: `"ts","ip","method","url",status,"ua"` (헤더 없음, `"`는 두 번 씀)
//! - json: `timestamp, ip, method, url, status, userAgent` 키를 가진 객체

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use logsift_core::types::AccessRecord;

use crate::error::LogPipelineError;

/// 레코드 출력 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 사람이 읽는 한 줄 요약
    #[default]
    Text,
    /// JSON 객체
    Json,
    /// 따옴표로 감싼 CSV
    Csv,
}

impl OutputFormat {
    /// 형식 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// 대소문자를 무시하고 형식 이름을 해석합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = LogPipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| LogPipelineError::Config {
            field: "format".to_owned(),
            reason: format!("unknown output format '{s}' (expected text, json or csv)"),
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON 출력 프레이밍
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFraming {
    /// `[` ... `]` 로 감싼 하나의 배열 (배치 모드)
    #[default]
    Array,
    /// 한 줄에 객체 하나 (tail 모드)
    Lines,
}

/// 레코드 인코더
pub struct RecordEncoder<W: Write> {
    sink: W,
    format: OutputFormat,
    framing: JsonFraming,
    begun: bool,
    written: u64,
}

impl<W: Write> RecordEncoder<W> {
    /// 배열 프레이밍으로 인코더를 생성합니다.
    pub fn new(sink: W, format: OutputFormat) -> Self {
        Self::with_framing(sink, format, JsonFraming::Array)
    }

    /// 프레이밍을 지정하여 인코더를 생성합니다. JSON이 아닌 형식에서는 무시됩니다.
    pub fn with_framing(sink: W, format: OutputFormat, framing: JsonFraming) -> Self {
        Self {
            sink,
            format,
            framing,
            begun: false,
            written: 0,
        }
    }

    fn is_json_array(&self) -> bool {
        self.format == OutputFormat::Json && self.framing == JsonFraming::Array
    }

    /// 출력을 시작합니다. JSON 배열 프레이밍이면 `[`를 씁니다.
    pub fn begin(&mut self) -> Result<(), LogPipelineError> {
        if self.begun {
            return Ok(());
        }
        self.begun = true;
        if self.is_json_array() {
            self.sink.write_all(b"[").map_err(LogPipelineError::Output)?;
        }
        Ok(())
    }

    /// 레코드 하나를 씁니다.
    pub fn write_record(&mut self, record: &AccessRecord) -> Result<(), LogPipelineError> {
        self.begin()?;
        self.encode(record).map_err(LogPipelineError::Output)?;
        self.written += 1;
        Ok(())
    }

    fn encode(&mut self, record: &AccessRecord) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.sink, "{record}"),
            OutputFormat::Csv => {
                writeln!(
                    self.sink,
                    "{},{},{},{},{},{}",
                    csv_quote(record.timestamp()),
                    csv_quote(record.ip()),
                    csv_quote(record.method()),
                    csv_quote(record.url()),
                    record.status(),
                    csv_quote(record.user_agent()),
                )
            }
            OutputFormat::Json => {
                if self.framing == JsonFraming::Array {
                    let separator: &[u8] = if self.written == 0 { b"\n" } else { b",\n" };
                    self.sink.write_all(separator)?;
                    serde_json::to_writer(&mut self.sink, record)?;
                } else {
                    serde_json::to_writer(&mut self.sink, record)?;
                    self.sink.write_all(b"\n")?;
                }
                Ok(())
            }
        }
    }

    /// 버퍼를 비웁니다.
    pub fn flush(&mut self) -> Result<(), LogPipelineError> {
        self.sink.flush().map_err(LogPipelineError::Output)
    }

    /// 출력을 마칩니다. JSON 배열 프레이밍이면 `]`를 쓰고 버퍼를 비웁니다.
    pub fn finish(&mut self) -> Result<(), LogPipelineError> {
        self.begin()?;
        if self.is_json_array() {
            let closing: &[u8] = if self.written == 0 { b"]\n" } else { b"\n]\n" };
            self.sink
                .write_all(closing)
                .map_err(LogPipelineError::Output)?;
        }
        self.flush()
    }

    /// 지금까지 쓴 레코드 수
    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// 출력 형식
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// 출력 싱크 참조
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// 인코더를 해체하고 출력 싱크를 반환합니다.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
