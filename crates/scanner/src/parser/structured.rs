//! JSON 목록 파서 (`termux-wifi-scaninfo`)
//!
//! 입력은 객체 배열이며 각 객체는 `ssid`, `bssid`, `rssi`, `frequency`,
//! `capabilities` 필드를 가집니다. `level`은 `rssi`의, `frequency_mhz`는
//! `frequency`의 별칭으로 허용합니다.
//!
//! # 입력 예시
//! ```text
//! [
//!   {"ssid":"Office","bssid":"aa:bb:cc:dd:ee:ff","rssi":-45,"frequency":2412,
//!    "capabilities":"[WPA2-PSK-CCMP][ESS]"}
//! ]
//! ```

use serde_json::{Map, Value};
use tracing::trace;

use crate::capability::CapabilityKind;
use crate::error::ScannerError;
use crate::parser::{ProvisionalSignal, SignalParser, classify_capabilities};

/// 입력 최대 크기 (1 MiB)
const MAX_INPUT_SIZE: usize = 1024 * 1024;

/// JSON 목록 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredParser;

impl StructuredParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    fn parse_record(obj: &Map<String, Value>) -> Option<ProvisionalSignal> {
        let identifier = obj
            .get("bssid")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())?
            .to_lowercase();

        let label = obj.get("ssid").and_then(Value::as_str).unwrap_or_default();

        let rssi = obj
            .get("rssi")
            .or_else(|| obj.get("level"))
            .and_then(value_as_i64)
            .and_then(|v| i32::try_from(v).ok());

        let frequency_mhz = obj
            .get("frequency")
            .or_else(|| obj.get("frequency_mhz"))
            .and_then(value_as_i64)
            .and_then(|v| u32::try_from(v).ok());

        let caps = obj
            .get("capabilities")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Some(ProvisionalSignal {
            identifier,
            label: ProvisionalSignal::normalize_label(label),
            rssi,
            frequency_mhz,
            encryption: classify_capabilities(caps),
        })
    }
}

/// 정수, 실수, 숫자 문자열을 모두 정수로 읽습니다.
fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

impl SignalParser for StructuredParser {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Structured
    }

    fn parse(&self, raw: &str) -> Result<Vec<ProvisionalSignal>, ScannerError> {
        if raw.len() > MAX_INPUT_SIZE {
            return Err(ScannerError::Parse {
                format: self.kind().to_string(),
                reason: format!("input too large: {} bytes", raw.len()),
            });
        }

        let value: Value = serde_json::from_str(raw.trim()).map_err(|e| ScannerError::Parse {
            format: self.kind().to_string(),
            reason: e.to_string(),
        })?;

        let Value::Array(items) = value else {
            return Err(ScannerError::Parse {
                format: self.kind().to_string(),
                reason: "top-level value is not an array".to_owned(),
            });
        };

        let signals = items
            .iter()
            .filter_map(|item| match item.as_object() {
                Some(obj) => Self::parse_record(obj),
                None => {
                    trace!("skipping non-object element");
                    None
                }
            })
            .collect();

        Ok(signals)
    }
}
