//! CRAH/AHU 풍량, 질량유량, 팬 동력 및 팬 발열 계산.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::off_coil::round_to;
use crate::psychro::{moist_air, AirState};

/// 현열 질량유량 계산에 쓰는 습공기 비열 [kJ/(kg·K)]
pub const CRAH_CP_KJ_PER_KG_K: f64 = 1.008;

/// 풍량 계산 상수. 설정 파일의 `[design.flows]` 에서 덮어쓸 수 있다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    /// AHU 덕트 정압 손실 [Pa]
    pub duct_pressure_drop_pa: f64,
    /// IT 부하에 곱하는 보조기기 부하 계수
    pub aux_load_factor: f64,
    /// 지정값이 없을 때 CRAH 풍량 대비 AHU 외기 풍량 비율
    pub ahu_flow_fraction: f64,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            duct_pressure_drop_pa: 600.0,
            aux_load_factor: 1.055,
            ahu_flow_fraction: 0.011,
        }
    }
}

/// 풍량 계산 입력 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("대기압이 올바르지 않습니다: {0} Pa")]
    InvalidPressure(f64),
    #[error("IT 부하는 음수일 수 없습니다: {0} kW")]
    NegativeItLoad(f64),
    /// CRAH 입출구 온도차가 0 이하이면 질량유량이 정의되지 않는다.
    #[error("CRAH 온도차가 0 이하입니다: {0} K")]
    NonPositiveDeltaT(f64),
    #[error("풍량 설정값 `{0}` 은(는) 0보다 커야 합니다")]
    InvalidSetting(&'static str),
    #[error("상태점 밀도를 계산할 수 없습니다: {0}")]
    Density(#[from] moist_air::PsychroError),
}

/// 시스템 풍량 계산 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemFlows {
    /// CRAH 현열 부하 [kW]
    pub q_sensible_kw: f64,
    /// CRAH 질량유량 [kg/s]
    pub crah_mass_flow_kg_s: f64,
    /// CRAH 체적유량 [m³/s]
    pub crah_vol_flow_m3_s: f64,
    /// AHU 체적유량 [m³/s]
    pub ahu_vol_flow_m3_s: f64,
    /// AHU 질량유량 [kg/s]
    pub ahu_mass_flow_kg_s: f64,
    /// AHU 풍량이 지정값에서 왔는지 여부
    pub ahu_vol_flow_overridden: bool,
    /// 팬 동력 [kW]
    pub fan_power_kw: f64,
    /// 팬 발열에 의한 온도 상승 [K]
    pub fan_delta_t_k: f64,
}

fn density_at(state: &AirState, pressure: f64) -> Result<f64, FlowError> {
    Ok(moist_air::moist_air_density(state.tdb, state.w, pressure)?)
}

/// 시스템 풍량을 계산한다.
///
/// * `it_load_kw` - IT 부하 [kW]
/// * `ahu_vol_override` - AHU 풍량 지정값 [m³/s], `None` 이면 CRAH 풍량 비율로 산정
/// * `crah_off`, `crah_on` - CRAH 코일 출구/입구 상태
/// * `ahu_off_coil` - AHU 코일 출구(제습) 상태. AHU 질량유량과 팬 발열의 기준
pub fn compute_system_flows(
    it_load_kw: f64,
    ahu_vol_override: Option<f64>,
    crah_off: &AirState,
    crah_on: &AirState,
    ahu_off_coil: &AirState,
    pressure_pa: f64,
    settings: &FlowSettings,
) -> Result<SystemFlows, FlowError> {
    if !pressure_pa.is_finite() || pressure_pa <= 0.0 {
        return Err(FlowError::InvalidPressure(pressure_pa));
    }
    if !it_load_kw.is_finite() || it_load_kw < 0.0 {
        return Err(FlowError::NegativeItLoad(it_load_kw));
    }
    if settings.duct_pressure_drop_pa <= 0.0 {
        return Err(FlowError::InvalidSetting("duct_pressure_drop_pa"));
    }
    if settings.aux_load_factor <= 0.0 {
        return Err(FlowError::InvalidSetting("aux_load_factor"));
    }
    if settings.ahu_flow_fraction <= 0.0 {
        return Err(FlowError::InvalidSetting("ahu_flow_fraction"));
    }
    let delta_t = crah_on.tdb - crah_off.tdb;
    if !(delta_t > 0.0) {
        return Err(FlowError::NonPositiveDeltaT(delta_t));
    }

    let q_sensible_kw = it_load_kw * settings.aux_load_factor;
    let crah_mass_flow_kg_s = q_sensible_kw / (CRAH_CP_KJ_PER_KG_K * delta_t);
    let rho_crah = 0.5 * (density_at(crah_off, pressure_pa)? + density_at(crah_on, pressure_pa)?);
    let crah_vol_flow_m3_s = crah_mass_flow_kg_s / rho_crah;

    let (ahu_vol_flow_m3_s, ahu_vol_flow_overridden) = match ahu_vol_override {
        Some(v) if v > 0.0 => (v, true),
        _ => (round_to(settings.ahu_flow_fraction * crah_vol_flow_m3_s, 3), false),
    };
    let ahu_mass_flow_kg_s = ahu_vol_flow_m3_s * density_at(ahu_off_coil, pressure_pa)?;

    let fan_power_kw = ahu_vol_flow_m3_s * settings.duct_pressure_drop_pa / 1000.0;
    let fan_delta_t_k = if ahu_vol_flow_m3_s > 0.0 {
        fan_power_kw / (ahu_vol_flow_m3_s * moist_air::moist_air_cp(ahu_off_coil.w))
    } else {
        0.0
    };

    let flows = SystemFlows {
        q_sensible_kw,
        crah_mass_flow_kg_s,
        crah_vol_flow_m3_s,
        ahu_vol_flow_m3_s,
        ahu_mass_flow_kg_s,
        ahu_vol_flow_overridden,
        fan_power_kw,
        fan_delta_t_k,
    };
    debug!(?flows, "시스템 풍량 계산 완료");
    Ok(flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: f64 = 101_325.0;

    fn states() -> (AirState, AirState, AirState) {
        (
            AirState::new("CRAH Off-Coil", 25.0, 16.5, P),
            AirState::new("CRAH On-Coil", 36.0, 19.8, P),
            AirState::new("OC Dehum", 15.1, 15.1, P),
        )
    }

    #[test]
    fn zero_it_load_gives_zero_flows() {
        let (off, on, oc) = states();
        let f = compute_system_flows(0.0, None, &off, &on, &oc, P, &FlowSettings::default())
            .unwrap();
        assert_eq!(f.crah_mass_flow_kg_s, 0.0);
        assert_eq!(f.ahu_vol_flow_m3_s, 0.0);
        assert_eq!(f.fan_power_kw, 0.0);
        assert_eq!(f.fan_delta_t_k, 0.0);
    }

    #[test]
    fn crah_mass_flow_follows_sensible_balance() {
        let (off, on, oc) = states();
        let f = compute_system_flows(1500.0, None, &off, &on, &oc, P, &FlowSettings::default())
            .unwrap();
        assert_relative_eq!(f.q_sensible_kw, 1582.5, epsilon = 1e-9);
        assert_relative_eq!(f.crah_mass_flow_kg_s, 1582.5 / (1.008 * 11.0), epsilon = 1e-9);
        assert!(!f.ahu_vol_flow_overridden);
        assert_relative_eq!(
            f.ahu_vol_flow_m3_s,
            round_to(0.011 * f.crah_vol_flow_m3_s, 3),
            epsilon = 1e-12
        );
    }

    #[test]
    fn override_sets_fan_power() {
        let (off, on, oc) = states();
        let f = compute_system_flows(1500.0, Some(2.0), &off, &on, &oc, P, &FlowSettings::default())
            .unwrap();
        assert!(f.ahu_vol_flow_overridden);
        assert_relative_eq!(f.fan_power_kw, 1.2, epsilon = 1e-12);
        assert_relative_eq!(
            f.fan_delta_t_k,
            1.2 / (2.0 * oc.cp()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn equal_crah_temperatures_are_rejected() {
        let (off, _, oc) = states();
        let same = AirState::new("CRAH On-Coil", 25.0, 17.0, P);
        assert_eq!(
            compute_system_flows(1500.0, None, &off, &same, &oc, P, &FlowSettings::default()),
            Err(FlowError::NonPositiveDeltaT(0.0))
        );
    }

    #[test]
    fn negative_load_is_rejected() {
        let (off, on, oc) = states();
        assert_eq!(
            compute_system_flows(-1.0, None, &off, &on, &oc, P, &FlowSettings::default()),
            Err(FlowError::NegativeItLoad(-1.0))
        );
    }
}
