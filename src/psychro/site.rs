use serde::Serialize;

use crate::units::altitude_to_pressure;

/// 현장 조건. 대기압은 고도로부터 계산되며 따로 저장하지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiteConditions {
    /// 해발 고도 [m]
    pub altitude_m: f64,
    /// 대기압 [Pa]
    pub pressure_pa: f64,
}

impl SiteConditions {
    /// 고도로부터 현장 조건을 만든다.
    pub fn from_altitude(altitude_m: f64) -> Self {
        SiteConditions {
            altitude_m,
            pressure_pa: altitude_to_pressure(altitude_m),
        }
    }
}
