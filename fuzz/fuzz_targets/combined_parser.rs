#![no_main]

use libfuzzer_sys::fuzz_target;
use logsift_core::pipeline::LineParser;
use logsift_pipeline::CombinedLogParser;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    match CombinedLogParser.parse(&line) {
        Ok(record) => assert!(record.url().len() <= logsift_core::types::MAX_URL_LEN),
        Err(err) => assert!(err.matched() < logsift_pipeline::parser::REQUIRED_FIELDS),
    }
});
