//! 스캔 출력 파싱 모듈 -- 수집 방식별 파서
//!
//! 각 파서는 [`SignalParser`] trait을 구현하며, 외부 명령의 원시 출력을
//! [`ProvisionalSignal`] 목록으로 변환합니다. 지표(채널, 거리, 위험도, 위치)는
//! 여기서 계산하지 않고 [`Enricher`](crate::enrich::Enricher)가 채웁니다.
//!
//! # 지원 형식
//! - `iw dev <if> scan` 블록 출력 ([`IwParser`])
//! - `wpa_cli scan_results` 탭 구분 출력 ([`WpaCliParser`])
//! - `termux-wifi-scaninfo` JSON 목록 ([`StructuredParser`])
//! - `dumpsys wifi` 진단 덤프 ([`DumpsysParser`])
//! - `/proc/net/wireless` 링크 품질 ([`ProcNetParser`])
//!
//! # 관용성
//!
//! 형식이 어긋난 줄/레코드는 개별적으로 건너뜁니다. 구조화 파서만 입력 전체가
//! JSON 배열이 아닐 때 에러를 반환하며, 수집 루프는 [`SignalParser::parse_lenient`]로
//! 에러를 빈 목록으로 바꿉니다.
//!
//! # 사용 예시
//! ```
//! use ironwave_scanner::capability::CapabilityKind;
//! use ironwave_scanner::parser::parser_for;
//!
//! let parser = parser_for(CapabilityKind::Supplicant).unwrap();
//! let signals = parser.parse_lenient("AA:BB:CC:DD:EE:FF\t2412\t-45\t[WPA2-PSK-CCMP][ESS]\tOffice");
//! assert_eq!(signals.len(), 1);
//! ```

pub mod dumpsys;
pub mod iw;
pub mod proc_net;
pub mod structured;
pub mod wpa_cli;

pub use dumpsys::DumpsysParser;
pub use iw::IwParser;
pub use proc_net::ProcNetParser;
pub use structured::StructuredParser;
pub use wpa_cli::WpaCliParser;

use ironwave_core::types::{EncryptionClass, HIDDEN_LABEL};
use serde::Serialize;
use tracing::warn;

use crate::capability::CapabilityKind;
use crate::error::ScannerError;

/// 파싱 직후의 신호 레코드 (지표 계산 전)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionalSignal {
    /// 장치 식별자 (보통 BSSID)
    pub identifier: String,
    /// 네트워크 이름 (숨김이면 `<HIDDEN>`)
    pub label: String,
    /// 수신 세기 (dBm)
    pub rssi: Option<i32>,
    /// 중심 주파수 (MHz)
    pub frequency_mhz: Option<u32>,
    /// 암호화 방식
    pub encryption: EncryptionClass,
}

impl ProvisionalSignal {
    /// 비어 있는 라벨을 숨김 표시로 정규화합니다.
    pub(crate) fn normalize_label(label: &str) -> String {
        let trimmed = label.trim();
        if trimmed.is_empty() || ironwave_core::types::is_hidden_label(trimmed) {
            HIDDEN_LABEL.to_owned()
        } else {
            trimmed.to_owned()
        }
    }
}

/// 스캔 출력 파서 trait
pub trait SignalParser: Send + Sync {
    /// 이 파서가 처리하는 수집 방식
    fn kind(&self) -> CapabilityKind;

    /// 원시 출력을 파싱합니다.
    ///
    /// 형식이 어긋난 레코드는 건너뛰고, 전체가 해석 불가능할 때만 에러를 반환합니다.
    fn parse(&self, raw: &str) -> Result<Vec<ProvisionalSignal>, ScannerError>;

    /// 파싱 에러를 로그로 남기고 빈 목록을 반환합니다.
    fn parse_lenient(&self, raw: &str) -> Vec<ProvisionalSignal> {
        match self.parse(raw) {
            Ok(signals) => signals,
            Err(e) => {
                warn!(method = %self.kind(), error = %e, "scan output could not be parsed");
                Vec::new()
            }
        }
    }
}

/// 수집 방식에 맞는 파서를 반환합니다. `Demo`는 파서가 없습니다.
pub fn parser_for(kind: CapabilityKind) -> Option<Box<dyn SignalParser>> {
    match kind {
        CapabilityKind::LinkLayer => Some(Box::new(IwParser::new())),
        CapabilityKind::Supplicant => Some(Box::new(WpaCliParser::new())),
        CapabilityKind::Structured => Some(Box::new(StructuredParser::new())),
        CapabilityKind::DiagnosticDump => Some(Box::new(DumpsysParser::new())),
        CapabilityKind::ProcStats => Some(Box::new(ProcNetParser::new())),
        CapabilityKind::Demo => None,
    }
}

/// `[WPA2-PSK-CCMP][ESS]` 형태의 능력 문자열에서 암호화 방식을 판별합니다.
///
/// 우선순위: WPA3/SAE > WPA2/RSN > WPA > WEP > Open > Unknown.
/// 빈 문자열이나 `[ESS]`/`[WPS]`/`[IBSS]` 토큰만 있으면 Open입니다.
pub fn classify_capabilities(caps: &str) -> EncryptionClass {
    let upper = caps.trim().to_uppercase();

    if upper.contains("WPA3") || upper.contains("SAE") {
        return EncryptionClass::Wpa3;
    }
    if upper.contains("WPA2") || upper.contains("RSN") {
        return EncryptionClass::Wpa2;
    }
    if upper.contains("WPA") {
        return EncryptionClass::Wpa;
    }
    if upper.contains("WEP") {
        return EncryptionClass::Wep;
    }
    if upper.is_empty() || upper == "OPEN" || upper == "NONE" {
        return EncryptionClass::Open;
    }

    let only_neutral_tokens = upper
        .split(['[', ']'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .all(|t| matches!(t, "ESS" | "WPS" | "IBSS" | "P2P"));
    if only_neutral_tokens {
        EncryptionClass::Open
    } else {
        EncryptionClass::Unknown
    }
}

/// `aa:bb:cc:dd:ee:ff` 형태인지 확인합니다.
pub(crate) fn is_mac_address(s: &str) -> bool {
    s.len() == 17
        && s.split(':').count() == 6
        && s
            .split(':')
            .all(|octet| octet.len() == 2 && octet.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_priority_order() {
        assert_eq!(
            classify_capabilities("[WPA2-SAE-CCMP][ESS]"),
            EncryptionClass::Wpa3
        );
        assert_eq!(
            classify_capabilities("[WPA-PSK-TKIP][WPA2-PSK-CCMP][ESS]"),
            EncryptionClass::Wpa2
        );
        assert_eq!(classify_capabilities("[RSN-PSK-CCMP]"), EncryptionClass::Wpa2);
        assert_eq!(classify_capabilities("[WPA-PSK-TKIP]"), EncryptionClass::Wpa);
        assert_eq!(classify_capabilities("[WEP]"), EncryptionClass::Wep);
    }

    #[test]
    fn classify_open_forms() {
        assert_eq!(classify_capabilities(""), EncryptionClass::Open);
        assert_eq!(classify_capabilities("[ESS]"), EncryptionClass::Open);
        assert_eq!(classify_capabilities("[WPS][ESS]"), EncryptionClass::Open);
        assert_eq!(classify_capabilities("open"), EncryptionClass::Open);
    }

    #[test]
    fn classify_unrecognized_is_unknown() {
        assert_eq!(classify_capabilities("[OWE]"), EncryptionClass::Unknown);
        assert_eq!(classify_capabilities("mystery"), EncryptionClass::Unknown);
    }

    #[test]
    fn mac_validation() {
        assert!(is_mac_address("aa:bb:cc:dd:ee:ff"));
        assert!(is_mac_address("00:11:22:33:44:55"));
        assert!(!is_mac_address("aa:bb:cc:dd:ee"));
        assert!(!is_mac_address("aa:bb:cc:dd:ee:fg"));
        assert!(!is_mac_address("aabb:cc:dd:ee:ff0"));
    }

    #[test]
    fn normalize_label_hides_empty() {
        assert_eq!(ProvisionalSignal::normalize_label(""), HIDDEN_LABEL);
        assert_eq!(ProvisionalSignal::normalize_label("   "), HIDDEN_LABEL);
        assert_eq!(ProvisionalSignal::normalize_label(" Office "), "Office");
    }

    #[test]
    fn every_probed_kind_has_parser() {
        for kind in CapabilityKind::PROBE_ORDER {
            let parser = parser_for(kind).expect("parser");
            assert_eq!(parser.kind(), kind);
        }
        assert!(parser_for(CapabilityKind::Demo).is_none());
    }

    // Property-based tests using proptest
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_input_does_not_panic(raw in ".{0,2000}") {
                for kind in CapabilityKind::PROBE_ORDER {
                    let parser = parser_for(kind).unwrap();
                    let _ = parser.parse_lenient(&raw);
                }
            }

            #[test]
            fn prose_yields_no_signals(raw in "[a-zA-Z \n]{0,500}") {
                for kind in CapabilityKind::PROBE_ORDER {
                    let parser = parser_for(kind).unwrap();
                    prop_assert!(parser.parse_lenient(&raw).is_empty(), "{kind} produced signals");
                }
            }

            #[test]
            fn classify_never_panics(caps in ".{0,100}") {
                let _ = classify_capabilities(&caps);
            }

            #[test]
            fn tsv_rows_round_trip_numbers(
                freq in 2400u32..6000,
                rssi in -100i32..0,
                ssid in "[A-Za-z0-9_]{1,32}",
            ) {
                let row = format!("aa:bb:cc:dd:ee:ff\t{freq}\t{rssi}\t[ESS]\t{ssid}");
                let signals = WpaCliParser::new().parse(&row).unwrap();
                prop_assert_eq!(signals.len(), 1);
                prop_assert_eq!(signals[0].rssi, Some(rssi));
                prop_assert_eq!(signals[0].frequency_mhz, Some(freq));
                prop_assert_eq!(&signals[0].label, &ssid);
            }
        }
    }
}
