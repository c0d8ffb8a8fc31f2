//! 스트림 처리기 -- 배치 모드 라인 처리
//!
//! [`StreamProcessor`]는 비동기 입력 소스를 끝까지 읽으며 각 라인을
//! 파싱 -> 필터 평가 -> 인코딩 순서로 처리합니다.
//!
//! 라인 단위 처리 로직([`LineProcessor`])과 필터([`RecordFilter`])는
//! tail 엔진과 공유됩니다.
//!
//! # 진단 출력
//! - strict 모드의 파싱 실패: `[warn] <label>:<line_no>: <diagnostic>` + `  >> <line>`
//! - 소스 처리 후 요약: `<label> total=<N> parsed=<N> failed=<N>`

use std::fmt;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use logsift_core::error::ParseError;
use logsift_core::pipeline::{LineParser, RecordMatcher};
use logsift_core::types::AccessRecord;

use crate::error::LogPipelineError;
use crate::output::RecordEncoder;
use crate::parser::CombinedLogParser;
use crate::query::{substring_match, Query};

/// 레코드 필터
///
/// 쿼리와 검색어가 모두 주어지면 쿼리가 우선합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordFilter {
    /// 모든 레코드 통과
    #[default]
    All,
    /// 컴파일된 구조화 쿼리
    Query(Query),
    /// 부분 문자열 검색
    Search {
        /// 검색어
        needle: String,
        /// 대소문자 무시 여부
        case_insensitive: bool,
    },
}

impl RecordFilter {
    /// CLI 입력으로부터 필터를 만듭니다.
    ///
    /// 쿼리 컴파일에 실패하면 진단 채널에 한 번 보고한 뒤 부분 문자열 검색으로
    /// 대체합니다. 검색어가 함께 주어졌으면 그 검색어를, 없으면 쿼리 원문을
    /// 검색어로 사용합니다.
    pub fn build(
        query: Option<&str>,
        search: Option<&str>,
        case_insensitive: bool,
        diagnostics: &mut dyn Write,
    ) -> Result<Self, LogPipelineError> {
        if let Some(expr) = query {
            return match Query::compile(expr, case_insensitive) {
                Ok(query) => {
                    debug!(terms = query.terms().len(), "query compiled");
                    Ok(Self::Query(query))
                }
                Err(err) => {
                    let needle = search.unwrap_or(expr);
                    debug!(error = %err, needle, "query compile failed");
                    writeln!(
                        diagnostics,
                        "query parse error: {err}; falling back to substring search"
                    )?;
                    Ok(Self::Search {
                        needle: needle.to_owned(),
                        case_insensitive,
                    })
                }
            };
        }

        Ok(match search {
            Some(needle) => Self::Search {
                needle: needle.to_owned(),
                case_insensitive,
            },
            None => Self::All,
        })
    }
}

impl RecordMatcher for RecordFilter {
    fn matches(&self, record: &AccessRecord) -> bool {
        match self {
            Self::All => true,
            Self::Query(query) => query.evaluate(record),
            Self::Search {
                needle,
                case_insensitive,
            } => substring_match(record, needle, *case_insensitive),
        }
    }
}

/// 라인 하나의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// 파싱 성공, 필터 통과, 출력됨
    Matched,
    /// 파싱 성공, 필터에서 제외됨
    Filtered,
    /// 파싱 실패
    Failed(ParseError),
}

/// 처리 통계
///
/// 항상 `parsed + failed == total`을 만족합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// 읽은 라인 수
    pub total: u64,
    /// 파싱 성공 수
    pub parsed: u64,
    /// 파싱 실패 수
    pub failed: u64,
    /// 필터를 통과해 출력된 수
    pub matched: u64,
}

impl Summary {
    /// 처리 결과를 통계에 반영합니다.
    pub fn record(&mut self, outcome: &LineOutcome) {
        self.total += 1;
        match outcome {
            LineOutcome::Matched => {
                self.parsed += 1;
                self.matched += 1;
            }
            LineOutcome::Filtered => self.parsed += 1,
            LineOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// 다른 통계를 더합니다.
    pub fn merge(&mut self, other: &Summary) {
        self.total += other.total;
        self.parsed += other.parsed;
        self.failed += other.failed;
        self.matched += other.matched;
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} parsed={} failed={}",
            self.total, self.parsed, self.failed
        )
    }
}

/// 라인 처리기 -- 파서, 필터, strict 플래그 묶음
///
/// 스트림 처리기와 tail 엔진이 공유합니다.
pub struct LineProcessor {
    parser: Box<dyn LineParser>,
    filter: RecordFilter,
    strict: bool,
}

impl LineProcessor {
    /// combined 로그 파서로 처리기를 생성합니다.
    pub fn new(filter: RecordFilter, strict: bool) -> Self {
        Self::with_parser(Box::new(CombinedLogParser::new()), filter, strict)
    }

    /// 파서를 지정하여 처리기를 생성합니다.
    pub fn with_parser(parser: Box<dyn LineParser>, filter: RecordFilter, strict: bool) -> Self {
        Self {
            parser,
            filter,
            strict,
        }
    }

    /// 라인 하나를 파싱하고, 필터를 통과하면 인코딩합니다.
    pub fn process<W: Write>(
        &self,
        line: &str,
        encoder: &mut RecordEncoder<W>,
    ) -> Result<LineOutcome, LogPipelineError> {
        match self.parser.parse(line) {
            Ok(record) if self.filter.matches(&record) => {
                encoder.write_record(&record)?;
                Ok(LineOutcome::Matched)
            }
            Ok(_) => Ok(LineOutcome::Filtered),
            Err(err) => Ok(LineOutcome::Failed(err)),
        }
    }

    /// strict 모드 여부
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// 파서 형식 이름
    pub fn format_name(&self) -> &str {
        self.parser.format_name()
    }

    /// 사용 중인 필터
    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }
}

/// 라인 끝의 `\n`, `\r\n`을 제거합니다.
pub(crate) fn trim_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

/// 배치 모드 스트림 처리기
pub struct StreamProcessor {
    processor: LineProcessor,
}

impl StreamProcessor {
    /// 새 스트림 처리기를 생성합니다.
    pub fn new(processor: LineProcessor) -> Self {
        Self { processor }
    }

    /// 소스를 끝까지 읽어 처리하고 통계를 반환합니다.
    ///
    /// 라인 길이에 상한이 없습니다. 읽기 중 I/O 에러가 나면 에러 내용과 그때까지의
    /// 요약을 진단 채널에 쓴 뒤 `Source` 에러를 반환하며, 해당 소스만 중단됩니다.
    pub async fn run<R, W>(
        &self,
        mut source: R,
        label: &str,
        encoder: &mut RecordEncoder<W>,
        diagnostics: &mut dyn Write,
    ) -> Result<Summary, LogPipelineError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        debug!(label, format = self.processor.format_name(), "processing source");

        let mut summary = Summary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = match source.read_until(b'\n', &mut buf).await {
                Ok(read) => read,
                Err(e) => {
                    warn!(label, error = %e, "source read failed");
                    writeln!(diagnostics, "{label}: {e}")?;
                    writeln!(diagnostics, "{label} {summary}")?;
                    return Err(LogPipelineError::Source {
                        label: label.to_owned(),
                        reason: e.to_string(),
                    });
                }
            };
            if read == 0 {
                break;
            }

            let line = String::from_utf8_lossy(trim_line_end(&buf));
            let outcome = self.processor.process(&line, encoder)?;

            if let (true, LineOutcome::Failed(err)) = (self.processor.strict(), &outcome) {
                writeln!(diagnostics, "[warn] {label}:{}: {err}", summary.total + 1)?;
                writeln!(diagnostics, "  >> {line}")?;
            }
            summary.record(&outcome);
        }

        writeln!(diagnostics, "{label} {summary}")?;
        debug!(
            label,
            total = summary.total,
            matched = summary.matched,
            failed = summary.failed,
            "source complete"
        );
        Ok(summary)
    }

    /// 내부 라인 처리기
    pub fn processor(&self) -> &LineProcessor {
        &self.processor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    const GOOD_200: &str = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /index.html HTTP/1.1" 200 512 "-" "curl/8.0""#;
    const GOOD_404: &str = r#"10.0.0.2 - - [10/Oct/2023:13:55:37 +0000] "GET /missing HTTP/1.1" 404 0 "-" "Mozilla/5.0""#;
    const GOOD_500: &str = r#"192.168.1.9 - - [10/Oct/2023:13:55:38 +0000] "POST /login HTTP/1.1" 500 0 "-" "Mozilla/5.0""#;

    async fn run_stream(
        input: &str,
        filter: RecordFilter,
        strict: bool,
        format: OutputFormat,
    ) -> (Summary, String, String) {
        let processor = StreamProcessor::new(LineProcessor::new(filter, strict));
        let mut encoder = RecordEncoder::new(Vec::new(), format);
        let mut diagnostics = Vec::new();
        encoder.begin().unwrap();
        let summary = processor
            .run(input.as_bytes(), "test.log", &mut encoder, &mut diagnostics)
            .await
            .unwrap();
        encoder.finish().unwrap();
        (
            summary,
            String::from_utf8(encoder.into_inner()).unwrap(),
            String::from_utf8(diagnostics).unwrap(),
        )
    }

    fn query(expr: &str) -> RecordFilter {
        RecordFilter::Query(Query::compile(expr, false).unwrap())
    }

    #[tokio::test]
    async fn all_filter_outputs_every_parsed_line() {
        let input = format!("{GOOD_200}\n{GOOD_404}\n{GOOD_500}\n");
        let (summary, out, diag) =
            run_stream(&input, RecordFilter::All, false, OutputFormat::Text).await;
        assert_eq!(
            summary,
            Summary {
                total: 3,
                parsed: 3,
                failed: 0,
                matched: 3
            }
        );
        assert_eq!(out.lines().count(), 3);
        assert_eq!(diag, "test.log total=3 parsed=3 failed=0\n");
    }

    #[tokio::test]
    async fn query_filters_records() {
        let input = format!("{GOOD_200}\n{GOOD_404}\n{GOOD_500}\n");
        let (summary, out, _) =
            run_stream(&input, query("status>=400"), false, OutputFormat::Text).await;
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.parsed, 3);
        assert!(out.contains("/missing -> 404"));
        assert!(out.contains("/login -> 500"));
        assert!(!out.contains("/index.html"));
    }

    #[tokio::test]
    async fn strict_mode_reports_unparsed_lines() {
        let input = format!("{GOOD_200}\nnot a log line\n{GOOD_404}");
        let (summary, _, diag) =
            run_stream(&input, RecordFilter::All, true, OutputFormat::Text).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.parsed + summary.failed, summary.total);
        let lines: Vec<_> = diag.lines().collect();
        assert!(lines[0].starts_with("[warn] test.log:2: "));
        assert_eq!(lines[1], "  >> not a log line");
        assert_eq!(lines[2], "test.log total=3 parsed=2 failed=1");
    }

    #[tokio::test]
    async fn lenient_mode_counts_failures_silently() {
        let input = format!("garbage\n\n{GOOD_200}\n");
        let (summary, _, diag) =
            run_stream(&input, RecordFilter::All, false, OutputFormat::Text).await;
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(diag, "test.log total=3 parsed=1 failed=2\n");
    }

    #[tokio::test]
    async fn crlf_and_missing_final_newline_are_handled() {
        let input = format!("{GOOD_200}\r\n{GOOD_404}");
        let (summary, out, _) =
            run_stream(&input, RecordFilter::All, false, OutputFormat::Csv).await;
        assert_eq!(summary.parsed, 2);
        assert!(out.lines().all(|l| !l.ends_with('\r')));
        assert!(out.contains(r#""Mozilla/5.0""#));
    }

    #[tokio::test]
    async fn empty_source_still_reports_summary() {
        let (summary, out, diag) =
            run_stream("", RecordFilter::All, true, OutputFormat::Json).await;
        assert_eq!(summary, Summary::default());
        assert_eq!(out, "[]\n");
        assert_eq!(diag, "test.log total=0 parsed=0 failed=0\n");
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let mut input = GOOD_200.replace("/index.html", "/caf\u{e9}").into_bytes();
        let pos = input.iter().position(|&b| b == 0xC3).unwrap();
        input[pos] = 0xFF;
        input.push(b'\n');

        let processor = StreamProcessor::new(LineProcessor::new(RecordFilter::All, false));
        let mut encoder = RecordEncoder::new(Vec::new(), OutputFormat::Text);
        let mut diagnostics = Vec::new();
        let summary = processor
            .run(input.as_slice(), "bin.log", &mut encoder, &mut diagnostics)
            .await
            .unwrap();
        assert_eq!(summary.parsed, 1);
        let out = String::from_utf8(encoder.into_inner()).unwrap();
        assert!(out.contains("/caf\u{FFFD}"));
    }

    #[test]
    fn build_prefers_query_over_search() {
        let mut diag = Vec::new();
        let filter =
            RecordFilter::build(Some("status:200"), Some("curl"), false, &mut diag).unwrap();
        assert!(matches!(filter, RecordFilter::Query(_)));
        assert!(diag.is_empty());
    }

    #[test]
    fn build_falls_back_to_search_on_bad_query() {
        let mut diag = Vec::new();
        let filter = RecordFilter::build(Some("host:web01"), None, true, &mut diag).unwrap();
        assert_eq!(
            filter,
            RecordFilter::Search {
                needle: "host:web01".to_owned(),
                case_insensitive: true
            }
        );
        let msg = String::from_utf8(diag).unwrap();
        assert!(msg.starts_with("query parse error: "));
        assert!(msg.trim_end().ends_with("; falling back to substring search"));
    }

    #[test]
    fn build_bad_query_falls_back_to_given_search_term() {
        let mut diag = Vec::new();
        let filter =
            RecordFilter::build(Some("host:web01"), Some("curl"), false, &mut diag).unwrap();
        assert_eq!(
            filter,
            RecordFilter::Search {
                needle: "curl".to_owned(),
                case_insensitive: false
            }
        );
        assert!(filter.matches(&CombinedLogParser.parse(GOOD_200).unwrap()));
        assert!(!filter.matches(&CombinedLogParser.parse(GOOD_404).unwrap()));
        assert!(String::from_utf8(diag).unwrap().contains("host"));
    }

    #[test]
    fn build_without_query_or_search_is_all() {
        let mut diag = Vec::new();
        assert_eq!(
            RecordFilter::build(None, None, false, &mut diag).unwrap(),
            RecordFilter::All
        );
        assert!(matches!(
            RecordFilter::build(None, Some("login"), false, &mut diag).unwrap(),
            RecordFilter::Search { .. }
        ));
    }

    /// 한 라인을 돌려준 뒤 읽기 에러를 내는 소스
    struct FailingSource {
        line: Option<Vec<u8>>,
    }

    impl tokio::io::AsyncRead for FailingSource {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::other("disk gone")))
        }
    }

    impl AsyncBufRead for FailingSource {
        fn poll_fill_buf(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<&[u8]>> {
            let this = self.get_mut();
            match &this.line {
                Some(line) => std::task::Poll::Ready(Ok(line.as_slice())),
                None => std::task::Poll::Ready(Err(std::io::Error::other("disk gone"))),
            }
        }

        fn consume(self: std::pin::Pin<&mut Self>, amt: usize) {
            let this = self.get_mut();
            if let Some(line) = &mut this.line {
                line.drain(..amt);
                if line.is_empty() {
                    this.line = None;
                }
            }
        }
    }

    #[tokio::test]
    async fn read_error_reports_partial_summary() {
        let processor = StreamProcessor::new(LineProcessor::new(RecordFilter::All, false));
        let mut encoder = RecordEncoder::new(Vec::new(), OutputFormat::Text);
        let mut diagnostics = Vec::new();
        let source = FailingSource {
            line: Some(format!("{GOOD_200}\n").into_bytes()),
        };

        let err = processor
            .run(source, "flaky.log", &mut encoder, &mut diagnostics)
            .await
            .unwrap_err();
        assert!(matches!(err, LogPipelineError::Source { ref label, .. } if label == "flaky.log"));

        let output = String::from_utf8(encoder.into_inner()).unwrap();
        assert_eq!(output.lines().count(), 1);

        let diag = String::from_utf8(diagnostics).unwrap();
        assert!(diag.contains("flaky.log: disk gone"));
        assert!(diag.contains("flaky.log total=1 parsed=1 failed=0"));
    }

    #[test]
    fn trim_line_end_variants() {
        assert_eq!(trim_line_end(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_end(b"abc\n"), b"abc");
        assert_eq!(trim_line_end(b"abc"), b"abc");
        assert_eq!(trim_line_end(b"\n"), b"");
    }

    #[test]
    fn summary_merge_adds_counts() {
        let mut total = Summary::default();
        total.merge(&Summary {
            total: 3,
            parsed: 2,
            failed: 1,
            matched: 1,
        });
        total.merge(&Summary {
            total: 2,
            parsed: 2,
            failed: 0,
            matched: 2,
        });
        assert_eq!(
            total,
            Summary {
                total: 5,
                parsed: 4,
                failed: 1,
                matched: 3
            }
        );
    }

    #[test]
    fn summary_display() {
        let summary = Summary {
            total: 5,
            parsed: 4,
            failed: 1,
            matched: 2,
        };
        assert_eq!(summary.to_string(), "total=5 parsed=4 failed=1");
    }
}
