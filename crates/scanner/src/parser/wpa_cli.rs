//! `wpa_cli scan_results` 탭 구분 출력 파서
//!
//! 열 순서는 `bssid / frequency / signal level / flags / ssid`입니다.
//! 열이 5개 미만이거나 숫자 열이 해석되지 않는 줄은 버리므로, 헤더 줄과
//! `Selected interface` 배너는 별도 처리 없이 걸러집니다.
//!
//! # 입력 예시
//! ```text
//! Selected interface 'wlan0'
//! bssid / frequency / signal level / flags / ssid
//! aa:bb:cc:dd:ee:ff	2412	-45	[WPA2-PSK-CCMP][ESS]	Office
//! ```

use crate::capability::CapabilityKind;
use crate::error::ScannerError;
use crate::parser::{ProvisionalSignal, SignalParser, classify_capabilities};

/// 최소 열 개수
const MIN_COLUMNS: usize = 5;

/// 탭 구분 출력 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct WpaCliParser;

impl WpaCliParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    fn parse_row(line: &str) -> Option<ProvisionalSignal> {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < MIN_COLUMNS {
            return None;
        }

        let identifier = parts[0].trim();
        if identifier.is_empty() {
            return None;
        }
        let frequency_mhz = parts[1].trim().parse::<u32>().ok()?;
        let rssi = parts[2].trim().parse::<i32>().ok()?;
        // SSID 안의 탭은 보존
        let ssid = parts[MIN_COLUMNS - 1..].join("\t");

        Some(ProvisionalSignal {
            identifier: identifier.to_lowercase(),
            label: ProvisionalSignal::normalize_label(&ssid),
            rssi: Some(rssi),
            frequency_mhz: Some(frequency_mhz),
            encryption: classify_capabilities(parts[3]),
        })
    }
}

impl SignalParser for WpaCliParser {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Supplicant
    }

    fn parse(&self, raw: &str) -> Result<Vec<ProvisionalSignal>, ScannerError> {
        Ok(raw.lines().filter_map(Self::parse_row).collect())
    }
}
