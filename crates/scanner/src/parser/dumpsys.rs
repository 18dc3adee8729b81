//! `dumpsys wifi` 진단 덤프 파서
//!
//! 덤프 중 스캔 결과 줄만 정규식으로 골라냅니다. Android 버전에 따라 SSID가
//! 플래그 뒤에 오기도 하고 앞에 오기도 하므로 두 패턴을 순서대로 시도합니다.
//!
//! # 입력 예시
//! ```text
//! Latest scan results:
//!     BSSID              Frequency  RSSI  Age(sec)   SSID                                 Flags
//!   aa:bb:cc:dd:ee:ff       2412    -45   12.345    Office      [WPA2-PSK-CCMP][ESS]
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::capability::CapabilityKind;
use crate::error::ScannerError;
use crate::parser::{ProvisionalSignal, SignalParser, classify_capabilities};

/// `MAC 주파수 RSSI [플래그] SSID`
static FLAGS_THEN_SSID: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"([0-9a-fA-F:]{17})\s+(\d+)\s+(-?\d+)\s+((?:\[[^\]]*\])+)\s*(.*)$")
});

/// `MAC 주파수 RSSI [나이] SSID [플래그]`
static SSID_THEN_FLAGS: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"([0-9a-fA-F:]{17})\s+(\d+)\s+(-?\d+)\s+(?:[\d.]+\s+)?(.*?)\s*((?:\[[^\]]*\])+)\s*$")
});

/// 진단 덤프 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct DumpsysParser;

impl DumpsysParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    fn parse_line(
        flags_first: &Regex,
        ssid_first: &Regex,
        line: &str,
    ) -> Option<ProvisionalSignal> {
        let (mac, freq, rssi, flags, ssid) = if let Some(c) = flags_first.captures(line) {
            (
                c.get(1)?.as_str(),
                c.get(2)?.as_str(),
                c.get(3)?.as_str(),
                c.get(4)?.as_str(),
                c.get(5).map_or("", |m| m.as_str()),
            )
        } else {
            let c = ssid_first.captures(line)?;
            (
                c.get(1)?.as_str(),
                c.get(2)?.as_str(),
                c.get(3)?.as_str(),
                c.get(5)?.as_str(),
                c.get(4).map_or("", |m| m.as_str()),
            )
        };

        if !super::is_mac_address(mac) {
            return None;
        }

        Some(ProvisionalSignal {
            identifier: mac.to_lowercase(),
            label: ProvisionalSignal::normalize_label(ssid),
            rssi: rssi.parse().ok(),
            frequency_mhz: freq.parse().ok(),
            encryption: classify_capabilities(flags),
        })
    }
}

fn compiled(pattern: &'static Result<Regex, regex::Error>) -> Result<&'static Regex, ScannerError> {
    pattern.as_ref().map_err(|e| ScannerError::Parse {
        format: CapabilityKind::DiagnosticDump.to_string(),
        reason: format!("invalid line pattern: {e}"),
    })
}

impl SignalParser for DumpsysParser {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::DiagnosticDump
    }

    fn parse(&self, raw: &str) -> Result<Vec<ProvisionalSignal>, ScannerError> {
        let flags_first = compiled(&FLAGS_THEN_SSID)?;
        let ssid_first = compiled(&SSID_THEN_FLAGS)?;

        let mut seen = HashSet::new();
        let signals = raw
            .lines()
            .filter_map(|line| Self::parse_line(flags_first, ssid_first, line))
            // 같은 덤프에 여러 번 나오면 첫 번째만 유지
            .filter(|s| seen.insert(s.identifier.clone()))
            .collect();
        Ok(signals)
    }
}
