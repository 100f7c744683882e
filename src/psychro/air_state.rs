use serde::Serialize;
use tracing::warn;

use super::moist_air::{self, PsychroError};

/// 근사 상태에서 사용하는 건공기 밀도 [kg/m³]
const FALLBACK_DENSITY: f64 = 1.2;
/// 근사 상태에서 이슬점을 건구온도보다 낮게 잡는 폭 [°C]
const FALLBACK_DEW_POINT_DEPRESSION: f64 = 2.0;

/// 상태 계산의 신뢰도를 나타낸다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StateQuality {
    /// 모든 관계식이 정상적으로 계산됨
    Valid,
    /// 관계식 계산에 실패하여 근사값으로 채워짐
    Approximated { reason: PsychroError },
}

/// 하나의 습공기 상태점. 생성 후 변경하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirState {
    /// 상태점 이름
    pub name: String,
    /// 건구온도 [°C]
    pub tdb: f64,
    /// 습구온도 [°C]
    pub twb: f64,
    /// 대기압 [Pa]
    pub pressure: f64,
    /// 습도비 [kg/kg]
    pub w: f64,
    /// 상대습도 [0~1]
    pub rh: f64,
    /// 비엔탈피 [kJ/kg건공기]
    pub h: f64,
    /// 이슬점 [°C]
    pub tdp: f64,
    /// 밀도 [kg/m³], 비체적의 역수
    pub density: f64,
    /// 계산 신뢰도
    pub quality: StateQuality,
}

impl AirState {
    /// 이름을 붙여 상태를 계산한다. 실패 시 근사 상태를 돌려준다.
    pub fn new(name: impl Into<String>, tdb: f64, twb: f64, pressure: f64) -> Self {
        let name = name.into();
        match try_compute_named(&name, tdb, twb, pressure) {
            Ok(state) => state,
            Err(reason) => {
                warn!(state = %name, tdb, twb, pressure, %reason, "습공기 상태 근사값 사용");
                Self::approximated(name, tdb, twb, pressure, reason)
            }
        }
    }

    fn approximated(name: String, tdb: f64, twb: f64, pressure: f64, reason: PsychroError) -> Self {
        AirState {
            name,
            tdb,
            twb,
            pressure,
            w: 0.0,
            rh: 0.0,
            h: 1.006 * tdb,
            tdp: tdb - FALLBACK_DEW_POINT_DEPRESSION,
            density: FALLBACK_DENSITY,
            quality: StateQuality::Approximated { reason },
        }
    }

    /// 관계식이 모두 정상 계산되었는지 여부.
    pub fn is_valid(&self) -> bool {
        matches!(self.quality, StateQuality::Valid)
    }

    /// 습도비 [g/kg] (선도 표시용)
    pub fn w_g_per_kg(&self) -> f64 {
        self.w * 1000.0
    }

    /// 습공기 기준 밀도 (1 + W) / v [kg/m³]. 풍량-질량유량 환산에 사용한다.
    pub fn moist_density(&self) -> f64 {
        (1.0 + self.w) * self.density
    }

    /// 상태점 비열 1.006 + 1.86·W [kJ/(kg·K)]
    pub fn cp(&self) -> f64 {
        moist_air::moist_air_cp(self.w)
    }
}

fn try_compute_named(name: &str, tdb: f64, twb: f64, pressure: f64) -> Result<AirState, PsychroError> {
    let w = moist_air::hum_ratio_from_wet_bulb(tdb, twb, pressure)?;
    let rh = moist_air::rel_hum_from_hum_ratio(tdb, w, pressure)?;
    let h = moist_air::moist_air_enthalpy(tdb, w);
    let tdp = moist_air::dew_point_from_hum_ratio(tdb, w, pressure)?;
    let v = moist_air::moist_air_volume(tdb, w, pressure)?;
    Ok(AirState {
        name: name.to_string(),
        tdb,
        twb,
        pressure,
        w,
        rh,
        h,
        tdp,
        density: 1.0 / v,
        quality: StateQuality::Valid,
    })
}

/// 건구/습구온도와 대기압으로 상태를 계산한다. 오류를 전파하지 않는다.
///
/// 계산 불가능한 입력이면 `h ≈ 1.006·Tdb`, `tdp ≈ Tdb − 2`, `ρ ≈ 1.2` 등으로 채운
/// [`StateQuality::Approximated`] 상태를 돌려준다.
pub fn compute_state(tdb: f64, twb: f64, pressure_pa: f64) -> AirState {
    AirState::new("", tdb, twb, pressure_pa)
}

/// [`compute_state`] 의 엄격한 버전. 근사 대신 오류를 돌려준다.
pub fn try_compute_state(tdb: f64, twb: f64, pressure_pa: f64) -> Result<AirState, PsychroError> {
    try_compute_named("", tdb, twb, pressure_pa)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pair_falls_back_to_approximation() {
        let state = compute_state(20.0, 25.0, 101_325.0);
        assert!(!state.is_valid());
        assert_eq!(state.w, 0.0);
        assert_eq!(state.rh, 0.0);
        assert!((state.h - 20.12).abs() < 1e-9);
        assert!((state.tdp - 18.0).abs() < 1e-9);
        assert_eq!(state.density, 1.2);
    }

    #[test]
    fn strict_variant_surfaces_error() {
        assert!(matches!(
            try_compute_state(20.0, 25.0, 101_325.0),
            Err(PsychroError::WetBulbAboveDryBulb { .. })
        ));
        assert!(matches!(
            try_compute_state(20.0, 15.0, -1.0),
            Err(PsychroError::NonPositivePressure(_))
        ));
    }
}
