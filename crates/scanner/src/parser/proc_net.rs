//! `/proc/net/wireless` 파서
//!
//! 주변 네트워크가 아니라 현재 연결의 링크 품질만 제공하므로,
//! 첫 번째 인터페이스 줄에서 합성 레코드 하나를 만듭니다.
//!
//! # 입력 예시
//! ```text
//! Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
//!  face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
//!  wlan0: 0000   54.  -56.  -256        0      0      0      0      0        0
//! ```

use ironwave_core::types::EncryptionClass;

use crate::capability::CapabilityKind;
use crate::error::ScannerError;
use crate::parser::{ProvisionalSignal, SignalParser};

/// 합성 레코드 라벨
pub const CONNECTED_LABEL: &str = "<CONNECTED>";

/// 합성 레코드 식별자
pub const CONNECTED_IDENTIFIER: &str = "00:00:00:00:00:00";

/// 헤더 줄 수
const HEADER_LINES: usize = 2;

/// link 품질을 dBm으로 근사할 때의 오프셋
const LINK_TO_DBM_OFFSET: i32 = 110;

/// 링크 품질 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcNetParser;

impl ProcNetParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    fn parse_row(line: &str) -> Option<ProvisionalSignal> {
        let (_iface, rest) = line.split_once(':')?;
        let mut cols = rest.split_whitespace();
        let _status = cols.next()?;
        let link = parse_column(cols.next()?)?;
        let level = parse_column(cols.next()?)?;

        let rssi = if level == 0 {
            link.saturating_sub(LINK_TO_DBM_OFFSET)
        } else if level > 0 {
            // 일부 드라이버는 부호 없는 8비트 값으로 보고
            level.saturating_sub(256)
        } else {
            level
        };

        Some(ProvisionalSignal {
            identifier: CONNECTED_IDENTIFIER.to_owned(),
            label: CONNECTED_LABEL.to_owned(),
            rssi: Some(rssi),
            frequency_mhz: None,
            encryption: EncryptionClass::Unknown,
        })
    }
}

/// `54.`처럼 끝에 점이 붙은 숫자를 읽습니다.
fn parse_column(col: &str) -> Option<i32> {
    let trimmed = col.trim_end_matches('.');
    trimmed
        .parse::<i32>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i32))
}

impl SignalParser for ProcNetParser {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::ProcStats
    }

    fn parse(&self, raw: &str) -> Result<Vec<ProvisionalSignal>, ScannerError> {
        Ok(raw
            .lines()
            .skip(HEADER_LINES)
            .find_map(Self::parse_row)
            .into_iter()
            .collect())
    }
}
