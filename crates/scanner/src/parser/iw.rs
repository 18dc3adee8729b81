//! `iw dev <if> scan` 블록 출력 파서
//!
//! 열 0에서 `BSS <mac>`으로 시작하는 줄이 새 레코드를 열고, 이전 레코드는 그 시점에
//! 확정됩니다. 들여쓰기된 속성 줄이 현재 레코드를 채웁니다.
//!
//! # 입력 예시
//! ```text
//! BSS aa:bb:cc:dd:ee:ff(on wlan0) -- associated
//! 	freq: 2412
//! 	capability: ESS Privacy ShortSlotTime (0x0411)
//! 	signal: -42.00 dBm
//! 	SSID: Office
//! 	RSN:	 * Version: 1
//! 		 * Authentication suites: PSK SAE
//! ```

use ironwave_core::types::EncryptionClass;

use crate::capability::CapabilityKind;
use crate::error::ScannerError;
use crate::parser::{ProvisionalSignal, SignalParser, is_mac_address};

/// 블록 출력 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct IwParser;

impl IwParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

/// 파싱 중인 BSS 레코드
#[derive(Default)]
struct BssBlock {
    mac: String,
    ssid: String,
    signal: Option<i32>,
    freq: Option<u32>,
    encryption: EncryptionClass,
    in_rsn: bool,
}

impl BssBlock {
    fn open(mac: String) -> Self {
        Self {
            mac,
            encryption: EncryptionClass::Open,
            ..Self::default()
        }
    }

    fn finish(self) -> ProvisionalSignal {
        ProvisionalSignal {
            identifier: self.mac,
            label: ProvisionalSignal::normalize_label(&self.ssid),
            rssi: self.signal,
            frequency_mhz: self.freq,
            encryption: self.encryption,
        }
    }

    fn apply(&mut self, line: &str) {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("SSID:") {
            self.ssid = rest.trim().to_owned();
        } else if let Some(rest) = trimmed.strip_prefix("signal:") {
            self.signal = parse_leading_f64(rest).map(|v| v.round() as i32);
        } else if let Some(rest) = trimmed.strip_prefix("freq:") {
            self.freq = parse_leading_f64(rest)
                .filter(|v| *v > 0.0 && *v < f64::from(u32::MAX))
                .map(|v| v.round() as u32);
        } else if let Some(rest) = trimmed.strip_prefix("capability:") {
            if rest.split_whitespace().any(|w| w == "Privacy") {
                self.encryption = self.encryption.upgrade(EncryptionClass::Wep);
            }
            self.in_rsn = false;
        } else if trimmed.starts_with("RSN:") {
            self.encryption = self.encryption.upgrade(EncryptionClass::Wpa2);
            self.in_rsn = true;
        } else if trimmed.starts_with("WPA:") {
            self.encryption = self.encryption.upgrade(EncryptionClass::Wpa);
            self.in_rsn = false;
        } else if self.in_rsn && trimmed.contains("Authentication suites:") {
            if trimmed.split_whitespace().any(|w| w == "SAE" || w == "FT/SAE") {
                self.encryption = self.encryption.upgrade(EncryptionClass::Wpa3);
            }
        } else if !trimmed.starts_with('*') {
            // RSN 하위 항목은 `*`로 시작하며, 그 외 속성 줄은 RSN 블록을 닫음
            self.in_rsn = false;
        }
    }
}

/// `-42.00 dBm` 같은 문자열에서 첫 번째 숫자 토큰을 읽습니다.
fn parse_leading_f64(s: &str) -> Option<f64> {
    s.split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// `BSS aa:bb:cc:dd:ee:ff(on wlan0)`에서 MAC을 추출합니다.
fn parse_bss_header(line: &str) -> Option<String> {
    let rest = line.strip_prefix("BSS ")?;
    let mac: String = rest
        .chars()
        .take_while(|c| c.is_ascii_hexdigit() || *c == ':')
        .collect();
    is_mac_address(&mac).then(|| mac.to_lowercase())
}

impl SignalParser for IwParser {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::LinkLayer
    }

    fn parse(&self, raw: &str) -> Result<Vec<ProvisionalSignal>, ScannerError> {
        let mut signals = Vec::new();
        let mut current: Option<BssBlock> = None;

        for line in raw.lines() {
            if line.starts_with("BSS ") {
                if let Some(block) = current.take() {
                    signals.push(block.finish());
                }
                // MAC이 없는 헤더는 다음 헤더까지의 속성 줄을 버림
                current = parse_bss_header(line).map(BssBlock::open);
                continue;
            }
            if let Some(block) = current.as_mut() {
                block.apply(line);
            }
        }
        if let Some(block) = current.take() {
            signals.push(block.finish());
        }

        Ok(signals)
    }
}
