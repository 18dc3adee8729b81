//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 스캐너가 만들고 데몬/CLI가 소비하는 신호 레코드와 스냅샷을 정의합니다.
//! 모든 타입은 한 번 만들어지면 수정되지 않습니다 (스캔마다 새로 생성).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 숨김 SSID를 나타내는 라벨
pub const HIDDEN_LABEL: &str = "<HIDDEN>";

/// 스냅샷이 아직 한 번도 발행되지 않았을 때의 수집 방식 이름
pub const INITIAL_METHOD: &str = "initializing";

/// 라벨이 숨김(빈 문자열, 널 바이트, 숨김 센티널)인지 확인합니다.
///
/// `iw`는 숨김 SSID를 `\x00` 이스케이프 시퀀스로 출력합니다.
pub fn is_hidden_label(label: &str) -> bool {
    let trimmed = label.trim();
    trimmed.is_empty()
        || trimmed == HIDDEN_LABEL
        || trimmed.contains("\\x00")
        || trimmed.chars().all(|c| c == '\0')
}

/// 암호화 방식
///
/// `Ord`는 보안 강도 순서가 아니라 선언 순서이므로 비교에는
/// [`EncryptionClass::strength`]를 사용합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionClass {
    /// 암호화 없음
    Open,
    /// WEP
    #[serde(rename = "WEP")]
    Wep,
    /// WPA (WPA2/3 미지원)
    #[serde(rename = "WPA")]
    Wpa,
    /// WPA2 (RSN)
    #[serde(rename = "WPA2")]
    Wpa2,
    /// WPA3 (SAE)
    #[serde(rename = "WPA3")]
    Wpa3,
    /// 판별 불가
    #[default]
    Unknown,
}

impl EncryptionClass {
    /// 모든 변형 (집계 순서)
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::Wep,
        Self::Wpa,
        Self::Wpa2,
        Self::Wpa3,
        Self::Unknown,
    ];

    /// 보안 강도 순위. `Unknown`이 가장 낮습니다.
    pub fn strength(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Open => 1,
            Self::Wep => 2,
            Self::Wpa => 3,
            Self::Wpa2 => 4,
            Self::Wpa3 => 5,
        }
    }

    /// 두 값 중 더 강한 암호화 방식을 반환합니다.
    ///
    /// 블록 형식 파서가 마커 줄을 만날 때마다 등급을 올리는 데 사용합니다.
    #[must_use]
    pub fn upgrade(self, other: Self) -> Self {
        if other.strength() > self.strength() {
            other
        } else {
            self
        }
    }

    /// 문자열에서 암호화 방식을 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "none" => Some(Self::Open),
            "wep" => Some(Self::Wep),
            "wpa" => Some(Self::Wpa),
            "wpa2" | "rsn" => Some(Self::Wpa2),
            "wpa3" | "sae" => Some(Self::Wpa3),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for EncryptionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Wep => write!(f, "WEP"),
            Self::Wpa => write!(f, "WPA"),
            Self::Wpa2 => write!(f, "WPA2"),
            Self::Wpa3 => write!(f, "WPA3"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// 신호 종류 태그 (시각화 클라이언트 호환용)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Wi-Fi 액세스 포인트
    #[default]
    Wifi,
}

/// 합성 2D 좌표 ([-100, 100] 범위)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// 위험도 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    /// 0–30
    Low,
    /// 31–60
    Medium,
    /// 61–100
    High,
}

impl RiskBand {
    /// 위험 점수를 구간으로 분류합니다.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=30 => Self::Low,
            31..=60 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// 관측된 액세스 포인트 하나
///
/// 보강(enrichment) 단계에서만 생성되며 이후 수정되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// 종류 태그
    #[serde(rename = "type", default)]
    pub kind: SignalKind,
    /// 하드웨어 주소 (BSSID)
    pub identifier: String,
    /// 광고 이름 (SSID). 숨김이면 [`HIDDEN_LABEL`]
    pub label: String,
    /// 신호 세기 (dBm, 음수일수록 약함)
    pub signal_strength: i32,
    /// 주파수 (MHz)
    pub frequency_mhz: Option<u32>,
    /// 주파수에서 유도한 채널 번호
    pub channel: Option<u32>,
    /// 암호화 방식
    pub encryption: EncryptionClass,
    /// 추정 거리 (미터, 0 이상 유한값)
    pub estimated_distance_m: f64,
    /// 위험 점수 (0–100)
    pub risk_score: u8,
    /// 합성 좌표
    pub position: Position,
    /// 관측 시각
    pub observed_at: DateTime<Utc>,
}

impl Signal {
    /// 라벨이 숨김 상태인지 확인합니다.
    pub fn is_hidden(&self) -> bool {
        is_hidden_label(&self.label)
    }

    /// 위험도 구간
    pub fn risk_band(&self) -> RiskBand {
        RiskBand::from_score(self.risk_score)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} dBm {} risk={}",
            self.label, self.identifier, self.signal_strength, self.encryption, self.risk_score,
        )
    }
}

/// 한 번의 스캔 결과 (발행 단위)
///
/// 신호는 세기 내림차순으로 정렬되어 있습니다.
/// 발행 후에는 `Arc`로 공유되며 절대 수정되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 신호 목록 (세기 내림차순)
    pub signals: Vec<Signal>,
    /// 이 스냅샷을 만든 수집 방식 이름
    pub method: String,
    /// 스캔 시각. 아직 스캔 전이면 `None`
    pub scanned_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// 첫 스캔 전에 반환되는 빈 스냅샷을 생성합니다.
    pub fn empty() -> Self {
        Self {
            signals: Vec::new(),
            method: INITIAL_METHOD.to_owned(),
            scanned_at: None,
        }
    }

    /// 신호 목록을 세기 내림차순으로 정렬하여 스냅샷을 생성합니다.
    ///
    /// 세기가 같으면 식별자 순으로 정렬하여 출력 순서를 고정합니다.
    pub fn new(mut signals: Vec<Signal>, method: impl Into<String>, scanned_at: DateTime<Utc>) -> Self {
        signals.sort_by(|a, b| {
            b.signal_strength
                .cmp(&a.signal_strength)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Self {
            signals,
            method: method.into(),
            scanned_at: Some(scanned_at),
        }
    }

    /// 신호 개수
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// 신호가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// 위험도 `High` 구간의 신호 개수
    pub fn high_risk_count(&self) -> usize {
        self.signals
            .iter()
            .filter(|s| s.risk_band() == RiskBand::High)
            .count()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// 암호화 방식별 개수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionCounts {
    pub open: usize,
    pub wep: usize,
    pub wpa: usize,
    pub wpa2: usize,
    pub wpa3: usize,
    pub unknown: usize,
}

impl EncryptionCounts {
    fn record(&mut self, class: EncryptionClass) {
        let slot = match class {
            EncryptionClass::Open => &mut self.open,
            EncryptionClass::Wep => &mut self.wep,
            EncryptionClass::Wpa => &mut self.wpa,
            EncryptionClass::Wpa2 => &mut self.wpa2,
            EncryptionClass::Wpa3 => &mut self.wpa3,
            EncryptionClass::Unknown => &mut self.unknown,
        };
        *slot += 1;
    }

    /// 방식별 개수를 반환합니다.
    pub fn get(&self, class: EncryptionClass) -> usize {
        match class {
            EncryptionClass::Open => self.open,
            EncryptionClass::Wep => self.wep,
            EncryptionClass::Wpa => self.wpa,
            EncryptionClass::Wpa2 => self.wpa2,
            EncryptionClass::Wpa3 => self.wpa3,
            EncryptionClass::Unknown => self.unknown,
        }
    }
}

/// 위험도 구간별 개수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// 스캔 1회 요약 (히스토리 링 버퍼 항목)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 스캔 시각
    pub scanned_at: DateTime<Utc>,
    /// 수집 방식
    pub method: String,
    /// 전체 신호 수
    pub total: usize,
    /// 암호화 방식별 개수
    pub by_encryption: EncryptionCounts,
    /// 위험도 구간별 개수
    pub by_risk: RiskCounts,
}

impl HistoryEntry {
    /// 스냅샷에서 요약을 생성합니다.
    ///
    /// 스캔 시각이 없는 스냅샷(초기 빈 스냅샷)은 `fallback` 시각을 사용합니다.
    pub fn from_snapshot(snapshot: &Snapshot, fallback: DateTime<Utc>) -> Self {
        let mut by_encryption = EncryptionCounts::default();
        let mut by_risk = RiskCounts::default();

        for signal in &snapshot.signals {
            by_encryption.record(signal.encryption);
            match signal.risk_band() {
                RiskBand::Low => by_risk.low += 1,
                RiskBand::Medium => by_risk.medium += 1,
                RiskBand::High => by_risk.high += 1,
            }
        }

        Self {
            scanned_at: snapshot.scanned_at.unwrap_or(fallback),
            method: snapshot.method.clone(),
            total: snapshot.len(),
            by_encryption,
            by_risk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(identifier: &str, strength: i32, encryption: EncryptionClass, risk: u8) -> Signal {
        Signal {
            kind: SignalKind::Wifi,
            identifier: identifier.to_owned(),
            label: "net".to_owned(),
            signal_strength: strength,
            frequency_mhz: Some(2412),
            channel: Some(1),
            encryption,
            estimated_distance_m: 1.0,
            risk_score: risk,
            position: Position::default(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn hidden_label_detection() {
        assert!(is_hidden_label(""));
        assert!(is_hidden_label("   "));
        assert!(is_hidden_label(HIDDEN_LABEL));
        assert!(is_hidden_label("\\x00\\x00\\x00"));
        assert!(is_hidden_label("\0\0"));
        assert!(!is_hidden_label("Office"));
        assert!(!is_hidden_label("<CONNECTED>"));
    }

    #[test]
    fn encryption_upgrade_keeps_stronger() {
        assert_eq!(
            EncryptionClass::Open.upgrade(EncryptionClass::Wpa),
            EncryptionClass::Wpa
        );
        assert_eq!(
            EncryptionClass::Wpa2.upgrade(EncryptionClass::Wpa),
            EncryptionClass::Wpa2
        );
        assert_eq!(
            EncryptionClass::Unknown.upgrade(EncryptionClass::Open),
            EncryptionClass::Open
        );
    }

    #[test]
    fn encryption_serializes_as_display_name() {
        assert_eq!(serde_json::to_string(&EncryptionClass::Wpa2).unwrap(), "\"WPA2\"");
        assert_eq!(serde_json::to_string(&EncryptionClass::Open).unwrap(), "\"Open\"");
        for class in EncryptionClass::ALL {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{class}\""));
        }
    }

    #[test]
    fn encryption_from_str_loose() {
        assert_eq!(EncryptionClass::from_str_loose("wpa2"), Some(EncryptionClass::Wpa2));
        assert_eq!(EncryptionClass::from_str_loose("OPEN"), Some(EncryptionClass::Open));
        assert_eq!(EncryptionClass::from_str_loose(" WEP "), Some(EncryptionClass::Wep));
        assert_eq!(EncryptionClass::from_str_loose("wpa9"), None);
    }

    #[test]
    fn risk_band_boundaries() {
        assert_eq!(RiskBand::from_score(0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(30), RiskBand::Low);
        assert_eq!(RiskBand::from_score(31), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(60), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(61), RiskBand::High);
        assert_eq!(RiskBand::from_score(100), RiskBand::High);
    }

    #[test]
    fn empty_snapshot_is_valid() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.method, INITIAL_METHOD);
        assert!(snapshot.scanned_at.is_none());
    }

    #[test]
    fn snapshot_sorts_by_descending_strength() {
        let snapshot = Snapshot::new(
            vec![
                signal("aa", -80, EncryptionClass::Open, 70),
                signal("bb", -30, EncryptionClass::Wpa2, 30),
                signal("cc", -55, EncryptionClass::Wep, 55),
            ],
            "iw",
            Utc::now(),
        );
        let strengths: Vec<i32> = snapshot.signals.iter().map(|s| s.signal_strength).collect();
        assert_eq!(strengths, vec![-30, -55, -80]);
        assert_eq!(snapshot.high_risk_count(), 1);
    }

    #[test]
    fn history_entry_counts_categories() {
        let now = Utc::now();
        let snapshot = Snapshot::new(
            vec![
                signal("aa", -80, EncryptionClass::Open, 70),
                signal("bb", -30, EncryptionClass::Wpa2, 30),
                signal("cc", -55, EncryptionClass::Wpa2, 45),
            ],
            "wpa_cli",
            now,
        );
        let entry = HistoryEntry::from_snapshot(&snapshot, Utc::now());

        assert_eq!(entry.scanned_at, now);
        assert_eq!(entry.method, "wpa_cli");
        assert_eq!(entry.total, 3);
        assert_eq!(entry.by_encryption.get(EncryptionClass::Wpa2), 2);
        assert_eq!(entry.by_encryption.get(EncryptionClass::Open), 1);
        assert_eq!(entry.by_risk.low, 1);
        assert_eq!(entry.by_risk.medium, 1);
        assert_eq!(entry.by_risk.high, 1);
    }

    #[test]
    fn signal_serializes_type_tag() {
        let json = serde_json::to_value(signal("aa", -50, EncryptionClass::Wpa3, 0)).unwrap();
        assert_eq!(json["type"], "wifi");
        assert_eq!(json["encryption"], "WPA3");
        assert_eq!(json["position"]["x"], 0);
    }
}
