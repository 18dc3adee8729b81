#![no_main]

use ironwave_scanner::parser::{ProcNetParser, SignalParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let parser = ProcNetParser::new();
        if let Ok(signals) = parser.parse(content) {
            for signal in signals {
                // 식별자는 비어 있을 수 없음
                assert!(!signal.identifier.is_empty());
            }
        }
    }
});
