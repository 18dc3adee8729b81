//! 주파수 → 채널 번호 변환

/// 5 GHz 대역 시작 주파수 (MHz)
const BAND_5GHZ_START: u32 = 5000;

/// 2.4 GHz 채널 0의 기준 주파수 (MHz)
const BAND_2GHZ_BASE: u32 = 2407;

/// 일본 전용 채널 14 (MHz)
const CHANNEL_14_FREQ: u32 = 2484;

/// 중심 주파수(MHz)를 채널 번호로 변환합니다.
///
/// 5 GHz 이상은 `(f - 5000) / 5`, 그 외는 `(f - 2407) / 5`이며 0 미만은 0으로 고정합니다.
/// 2484 MHz는 5 MHz 간격 규칙을 따르지 않으므로 14로 직접 매핑합니다.
///
/// ```
/// use ironwave_scanner::channel::frequency_to_channel;
///
/// assert_eq!(frequency_to_channel(2412), 1);
/// assert_eq!(frequency_to_channel(5180), 36);
/// ```
pub fn frequency_to_channel(freq_mhz: u32) -> u32 {
    if freq_mhz >= BAND_5GHZ_START {
        (freq_mhz - BAND_5GHZ_START) / 5
    } else if freq_mhz == CHANNEL_14_FREQ {
        14
    } else {
        freq_mhz.saturating_sub(BAND_2GHZ_BASE) / 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_2ghz_channels() {
        assert_eq!(frequency_to_channel(2412), 1);
        assert_eq!(frequency_to_channel(2437), 6);
        assert_eq!(frequency_to_channel(2462), 11);
        assert_eq!(frequency_to_channel(2472), 13);
        assert_eq!(frequency_to_channel(2484), 14);
    }

    #[test]
    fn band_5ghz_channels() {
        assert_eq!(frequency_to_channel(5180), 36);
        assert_eq!(frequency_to_channel(5500), 100);
        assert_eq!(frequency_to_channel(5745), 149);
        assert_eq!(frequency_to_channel(5825), 165);
    }

    #[test]
    fn below_band_saturates_to_zero() {
        assert_eq!(frequency_to_channel(0), 0);
        assert_eq!(frequency_to_channel(2400), 0);
    }
}
