//! 표시 단위 정의 및 변환 모듈 모음. 내부 계산은 °C / Pa(절대압) 기준이다.

pub mod pressure;
pub mod temperature;

pub use pressure::{altitude_to_pressure, from_pascal, to_pascal, PressureUnit, STANDARD_ATMOSPHERE_PA};
pub use temperature::{celsius_to_kelvin, from_celsius, to_celsius, TemperatureUnit};
