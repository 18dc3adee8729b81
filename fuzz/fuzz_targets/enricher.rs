#![no_main]

use arbitrary::Arbitrary;
use chrono::Utc;
use libfuzzer_sys::fuzz_target;

use ironwave_core::types::EncryptionClass;
use ironwave_scanner::{Enricher, ProvisionalSignal, RiskPolicy};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    identifier: String,
    label: String,
    rssi: Option<i32>,
    frequency_mhz: Option<u32>,
    encryption: u8,
}

fuzz_target!(|input: FuzzInput| {
    let encryption = EncryptionClass::ALL[usize::from(input.encryption) % EncryptionClass::ALL.len()];
    let provisional = ProvisionalSignal {
        identifier: input.identifier,
        label: input.label,
        rssi: input.rssi,
        frequency_mhz: input.frequency_mhz,
        encryption,
    };

    let signal = Enricher::new(RiskPolicy::default()).enrich(provisional, Utc::now());

    assert!(signal.risk_score <= 100);
    assert!(signal.estimated_distance_m.is_finite());
    assert!(signal.estimated_distance_m >= 0.0);
    assert!((-100..100).contains(&signal.position.x));
    assert!((-100..100).contains(&signal.position.y));
});
