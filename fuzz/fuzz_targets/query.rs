#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logsift_core::types::AccessRecord;
use logsift_pipeline::{substring_match, wildcard_match, Query};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    expr: String,
    case_insensitive: bool,
    timestamp: String,
    ip: String,
    method: String,
    url: String,
    status: u16,
    user_agent: String,
}

fuzz_target!(|input: FuzzInput| {
    let record = AccessRecord::new(
        &input.timestamp,
        &input.ip,
        &input.method,
        &input.url,
        input.status,
        &input.user_agent,
    );

    // 컴파일 실패는 정상 경로 (부분 문자열 검색으로 대체됨)
    match Query::compile(&input.expr, input.case_insensitive) {
        Ok(query) => {
            let _ = query.evaluate(&record);
        }
        Err(_) => {
            let _ = substring_match(&record, &input.expr, input.case_insensitive);
        }
    }

    let _ = wildcard_match(&input.expr, record.url(), input.case_insensitive);
});
