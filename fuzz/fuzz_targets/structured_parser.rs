#![no_main]

use ironwave_scanner::parser::{SignalParser, StructuredParser, classify_capabilities};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = StructuredParser::new().parse(content);
        // 능력 문자열 분류도 같은 입력으로 확인
        let _ = classify_capabilities(content);
    }
});
