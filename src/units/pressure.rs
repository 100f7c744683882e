use serde::{Deserialize, Serialize};

/// 표준 대기압 [Pa].
pub const STANDARD_ATMOSPHERE_PA: f64 = 101_325.0;

const PA_PER_KPA: f64 = 1_000.0;
const PA_PER_BAR: f64 = 100_000.0;
const PA_PER_PSI: f64 = 6_894.757;
const PA_PER_MMHG: f64 = 133.322;

/// 보고서 표시용 압력 단위. 내부 기준은 항상 절대압 Pa 이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureUnit {
    Pascal,
    KiloPascal,
    BarA,
    Psia,
    MmHg,
}

impl PressureUnit {
    /// 표시용 단위 기호.
    pub fn symbol(self) -> &'static str {
        match self {
            PressureUnit::Pascal => "Pa",
            PressureUnit::KiloPascal => "kPa",
            PressureUnit::BarA => "bar(a)",
            PressureUnit::Psia => "psia",
            PressureUnit::MmHg => "mmHg",
        }
    }
}

/// 절대압 Pa 값을 원하는 단위로 변환한다.
pub fn from_pascal(value_pa: f64, unit: PressureUnit) -> f64 {
    match unit {
        PressureUnit::Pascal => value_pa,
        PressureUnit::KiloPascal => value_pa / PA_PER_KPA,
        PressureUnit::BarA => value_pa / PA_PER_BAR,
        PressureUnit::Psia => value_pa / PA_PER_PSI,
        PressureUnit::MmHg => value_pa / PA_PER_MMHG,
    }
}

/// 주어진 절대압을 Pa 로 변환한다.
pub fn to_pascal(value: f64, unit: PressureUnit) -> f64 {
    match unit {
        PressureUnit::Pascal => value,
        PressureUnit::KiloPascal => value * PA_PER_KPA,
        PressureUnit::BarA => value * PA_PER_BAR,
        PressureUnit::Psia => value * PA_PER_PSI,
        PressureUnit::MmHg => value * PA_PER_MMHG,
    }
}

/// 표준 대기 모델로 고도[m]에서의 대기압[Pa]을 구한다.
///
/// ASHRAE Fundamentals 1장 식(3): p = 101325 · (1 − 2.25577e-5 · Z)^5.2559
pub fn altitude_to_pressure(altitude_m: f64) -> f64 {
    STANDARD_ATMOSPHERE_PA * (1.0 - 2.25577e-5 * altitude_m).powf(5.25588)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_is_standard_atmosphere() {
        assert!((altitude_to_pressure(0.0) - STANDARD_ATMOSPHERE_PA).abs() < 1e-9);
    }

    #[test]
    fn kilopascal_display() {
        assert!((from_pascal(101_325.0, PressureUnit::KiloPascal) - 101.325).abs() < 1e-12);
        assert!((to_pascal(1.0, PressureUnit::BarA) - 100_000.0).abs() < 1e-9);
    }
}
