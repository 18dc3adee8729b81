//! 데모 신호원
//!
//! 사용 가능한 수집 방식이 없을 때 고정된 예시 네트워크를 돌려줍니다.
//! 식별자가 고정이므로 시각화 좌표도 사이클마다 같고, 세기만 사이클 번호에 따라
//! ±5 dBm 안에서 결정적으로 흔들립니다.

use ironwave_core::types::EncryptionClass;

use crate::enrich::DEFAULT_FREQUENCY_MHZ;
use crate::parser::ProvisionalSignal;

/// 예시 네트워크 (식별자, 라벨, 기준 세기, 암호화)
const DEMO_NETWORKS: [(&str, &str, i32, EncryptionClass); 5] = [
    ("02:00:5e:00:00:01", "Tactical_Ops", -45, EncryptionClass::Wpa2),
    ("02:00:5e:00:00:02", "Free_Wifi", -80, EncryptionClass::Open),
    ("02:00:5e:00:00:03", "Surveillance_Node", -65, EncryptionClass::Wep),
    ("02:00:5e:00:00:04", "Unknown_Device", -30, EncryptionClass::Wpa3),
    ("02:00:5e:00:00:05", "Samsung_S24", -55, EncryptionClass::Wpa2),
];

/// 세기 흔들림 패턴 (최대 ±5 dBm)
const SWAY: [i32; 8] = [0, 2, 4, 5, 3, 0, -3, -5];

/// 사이클 번호에 대한 데모 신호 목록을 만듭니다.
pub fn demo_signals(cycle: u64) -> Vec<ProvisionalSignal> {
    DEMO_NETWORKS
        .iter()
        .enumerate()
        .map(|(i, (identifier, label, base, encryption))| {
            let idx = ((cycle % SWAY.len() as u64) as usize + i * 3) % SWAY.len();
            ProvisionalSignal {
                identifier: (*identifier).to_owned(),
                label: (*label).to_owned(),
                rssi: Some((base + SWAY[idx]).min(0)),
                frequency_mhz: Some(DEFAULT_FREQUENCY_MHZ),
                encryption: *encryption,
            }
        })
        .collect()
}
