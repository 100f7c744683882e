use serde::{Deserialize, Serialize};

/// 0 °C 를 켈빈으로 나타낸 값.
pub const ZERO_CELSIUS_AS_KELVIN: f64 = 273.15;

/// 보고서 표시용 온도 단위. 내부 계산은 항상 °C 이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    Kelvin,
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// 표시용 단위 기호.
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Kelvin => "K",
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

/// 섭씨 온도를 켈빈으로 변환한다.
pub fn celsius_to_kelvin(t_c: f64) -> f64 {
    t_c + ZERO_CELSIUS_AS_KELVIN
}

/// 섭씨 값을 원하는 표시 단위로 변환한다.
pub fn from_celsius(t_c: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Kelvin => celsius_to_kelvin(t_c),
        TemperatureUnit::Celsius => t_c,
        TemperatureUnit::Fahrenheit => t_c * 9.0 / 5.0 + 32.0,
    }
}

/// 표시 단위 값을 섭씨로 되돌린다.
pub fn to_celsius(value: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Kelvin => value - ZERO_CELSIUS_AS_KELVIN,
        TemperatureUnit::Celsius => value,
        TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_round_trip_of_freezing_point() {
        assert!((from_celsius(0.0, TemperatureUnit::Fahrenheit) - 32.0).abs() < 1e-12);
        assert!((to_celsius(212.0, TemperatureUnit::Fahrenheit) - 100.0).abs() < 1e-12);
    }
}
