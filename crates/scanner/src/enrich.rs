//! 신호 지표 보강 -- 채널, 추정 거리, 위험도, 시각화 좌표
//!
//! [`Enricher::enrich`]는 파서가 만든 [`ProvisionalSignal`]을 완성된 [`Signal`]로
//! 변환합니다. 모든 계산은 순수 함수이며 실패하지 않습니다.
//!
//! # 거리 (자유 공간 경로 손실)
//!
//! ```text
//! exponent = (27.55 - 20 * log10(freq_mhz) + |rssi|) / 20
//! distance = 10 ^ exponent   (소수점 둘째 자리 반올림)
//! ```
//!
//! # 위험도
//!
//! [`RiskPolicy`]의 가중치를 더한 뒤 0-100으로 고정합니다.

use chrono::{DateTime, Utc};
use ironwave_core::types::{EncryptionClass, Position, Signal, SignalKind, is_hidden_label};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::channel::frequency_to_channel;
use crate::parser::ProvisionalSignal;

/// 주파수가 없을 때 사용하는 기본값 (채널 1)
pub const DEFAULT_FREQUENCY_MHZ: u32 = 2412;

/// 세기가 없을 때 사용하는 기본값 (dBm)
pub const DEFAULT_RSSI_DBM: i32 = -100;

/// 자유 공간 경로 손실 상수 (MHz, m 단위)
const FSPL_CONSTANT: f64 = 27.55;

/// 시각화 좌표 범위 (-100..=99)
const POSITION_SPAN: u16 = 200;
const POSITION_OFFSET: i32 = 100;

/// 위험 점수 상한
const MAX_RISK_SCORE: u32 = 100;

/// 위험도 가중치
///
/// 기본값은 암호화가 약할수록, 가까울수록, 숨겨져 있을수록 점수가 높아집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// 암호화 없음
    pub open: u8,
    /// WEP
    pub wep: u8,
    /// WPA (WPA2/3 미지원)
    pub wpa: u8,
    /// 판별 불가
    pub unknown: u8,
    /// 매우 가까움 (rssi > `near_threshold_dbm`)
    pub near: u8,
    /// 가까움 (`mid_threshold_dbm` < rssi <= `near_threshold_dbm`)
    pub mid: u8,
    /// 매우 가까움 기준 (dBm)
    pub near_threshold_dbm: i32,
    /// 가까움 기준 (dBm)
    pub mid_threshold_dbm: i32,
    /// 숨김 SSID
    pub hidden: u8,
    /// 의심 키워드 포함
    pub keyword: u8,
    /// 의심 키워드 (소문자, 부분 일치)
    pub keywords: Vec<String>,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            open: 50,
            wep: 40,
            wpa: 25,
            unknown: 0,
            near: 30,
            mid: 15,
            near_threshold_dbm: -50,
            mid_threshold_dbm: -70,
            hidden: 20,
            keyword: 10,
            keywords: ["free", "guest", "public", "test", "default"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }
}

impl RiskPolicy {
    /// 위험 점수를 계산합니다 (0-100).
    pub fn score(&self, encryption: EncryptionClass, rssi: i32, label: &str) -> u8 {
        let mut score = u32::from(match encryption {
            EncryptionClass::Open => self.open,
            EncryptionClass::Wep => self.wep,
            EncryptionClass::Wpa => self.wpa,
            EncryptionClass::Unknown => self.unknown,
            EncryptionClass::Wpa2 | EncryptionClass::Wpa3 => 0,
        });

        if rssi > self.near_threshold_dbm {
            score += u32::from(self.near);
        } else if rssi > self.mid_threshold_dbm {
            score += u32::from(self.mid);
        }

        if is_hidden_label(label) {
            score += u32::from(self.hidden);
        } else {
            let lower = label.to_lowercase();
            if self.keywords.iter().any(|k| lower.contains(k.as_str())) {
                score += u32::from(self.keyword);
            }
        }

        // min으로 100 이하가 보장됨
        score.min(MAX_RISK_SCORE) as u8
    }
}

/// 추정 거리(m)를 계산합니다.
///
/// 주파수가 없거나 0이면 2412 MHz를 사용합니다.
/// 결과가 유한하지 않거나 음수이면 0.0을 반환합니다.
pub fn estimate_distance(rssi: i32, frequency_mhz: Option<u32>) -> f64 {
    let freq = match frequency_mhz {
        Some(f) if f > 0 => f64::from(f),
        _ => f64::from(DEFAULT_FREQUENCY_MHZ),
    };
    let exponent = (FSPL_CONSTANT - 20.0 * freq.log10() + f64::from(rssi).abs()) / 20.0;
    let distance = (10f64.powf(exponent) * 100.0).round() / 100.0;
    if distance.is_finite() && distance >= 0.0 {
        distance
    } else {
        0.0
    }
}

/// 식별자에서 결정적인 시각화 좌표를 만듭니다.
///
/// SHA-256 16진 다이제스트의 앞 4자리가 x, 다음 4자리가 y입니다.
pub fn position_for(identifier: &str) -> Position {
    let digest = Sha256::digest(identifier.as_bytes());
    // 16진 4자리 = 2바이트
    let x = u16::from_be_bytes([digest[0], digest[1]]);
    let y = u16::from_be_bytes([digest[2], digest[3]]);
    Position {
        x: i32::from(x % POSITION_SPAN) - POSITION_OFFSET,
        y: i32::from(y % POSITION_SPAN) - POSITION_OFFSET,
    }
}

/// 지표 보강기
#[derive(Debug, Clone, Default)]
pub struct Enricher {
    policy: RiskPolicy,
}

impl Enricher {
    /// 주어진 위험도 정책으로 보강기를 생성합니다.
    pub fn new(policy: RiskPolicy) -> Self {
        Self { policy }
    }

    /// 적용 중인 위험도 정책
    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// 파싱 결과를 완성된 신호로 변환합니다.
    pub fn enrich(&self, provisional: ProvisionalSignal, observed_at: DateTime<Utc>) -> Signal {
        let rssi = provisional.rssi.unwrap_or(DEFAULT_RSSI_DBM);
        let risk_score = self
            .policy
            .score(provisional.encryption, rssi, &provisional.label);

        Signal {
            kind: SignalKind::Wifi,
            estimated_distance_m: estimate_distance(rssi, provisional.frequency_mhz),
            channel: provisional.frequency_mhz.map(frequency_to_channel),
            position: position_for(&provisional.identifier),
            identifier: provisional.identifier,
            label: provisional.label,
            signal_strength: rssi,
            frequency_mhz: provisional.frequency_mhz,
            encryption: provisional.encryption,
            risk_score,
            observed_at,
        }
    }

    /// 여러 신호를 한 번에 변환합니다.
    pub fn enrich_all(
        &self,
        provisional: Vec<ProvisionalSignal>,
        observed_at: DateTime<Utc>,
    ) -> Vec<Signal> {
        provisional
            .into_iter()
            .map(|p| self.enrich(p, observed_at))
            .collect()
    }
}
