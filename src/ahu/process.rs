//! 상태점 쌍 사이의 습공기 과정과 열부하(현열/잠열/전열, SHR, 수분 이동량).
//!
//! 열부하 식은 설계 스프레드시트의 계산 규약을 그대로 따른다.
//! 전열과 현열은 출구 질량유량을, 현열 비열은 입구 상태의 값을 쓴다.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use super::states;
use super::system_flows::SystemFlows;
use crate::psychro::{compute_state, AirState};

/// 이 값 이하의 전열[kW]에서는 SHR 을 정의하지 않는다.
pub const SHR_Q_TOTAL_EPSILON_KW: f64 = 0.001;

/// 하나의 습공기 과정. 계산 시점의 입출구 값을 복사해 보관한다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Process {
    pub name: String,
    /// 입구/출구 상태점 이름 (상태 맵의 키)
    pub state_in: String,
    pub state_out: String,
    pub tdb_in: f64,
    pub tdb_out: f64,
    /// 습도비 [g/kg]
    pub w_in_g_per_kg: f64,
    pub w_out_g_per_kg: f64,
    /// 비엔탈피 [kJ/kg]
    pub h_in: f64,
    pub h_out: f64,
    /// 체적유량 [m³/s]
    pub vol_flow_m3_s: f64,
    /// 질량유량 [kg/s]
    pub mdot_in: f64,
    pub mdot_out: f64,
    /// 현열/잠열/전열 [kW]
    pub q_sensible_kw: f64,
    pub q_latent_kw: f64,
    pub q_total_kw: f64,
    /// 현열비. 전열이 0 에 가까우면 `None`
    pub shr: Option<f64>,
    /// 수분 이동량 [g/s]. 양수는 제습, 음수는 가습
    pub moisture_g_per_s: f64,
    /// 입출구 상태가 모두 정상 계산되었는지 여부
    pub valid: bool,
}

impl Process {
    /// 이미 계산된 두 상태점과 체적유량으로 과정을 만든다.
    pub fn from_states(name: impl Into<String>, inlet: &AirState, outlet: &AirState, vol_flow: f64) -> Self {
        let mdot_in = vol_flow * inlet.moist_density();
        let mdot_out = vol_flow * outlet.moist_density();

        let q_total_kw = mdot_out * (outlet.h - inlet.h);
        let q_sensible_kw = mdot_out * inlet.cp() * (outlet.tdb - inlet.tdb);
        let q_latent_kw = q_total_kw - q_sensible_kw;
        let shr = (q_total_kw.abs() > SHR_Q_TOTAL_EPSILON_KW).then(|| q_sensible_kw / q_total_kw);
        let moisture_g_per_s = mdot_out * (inlet.w_g_per_kg() - outlet.w_g_per_kg());

        let name = name.into();
        let valid = inlet.is_valid() && outlet.is_valid();
        if !valid {
            warn!(process = %name, "근사 상태점을 포함한 과정");
        }

        Process {
            name,
            state_in: inlet.name.clone(),
            state_out: outlet.name.clone(),
            tdb_in: inlet.tdb,
            tdb_out: outlet.tdb,
            w_in_g_per_kg: inlet.w_g_per_kg(),
            w_out_g_per_kg: outlet.w_g_per_kg(),
            h_in: inlet.h,
            h_out: outlet.h,
            vol_flow_m3_s: vol_flow,
            mdot_in,
            mdot_out,
            q_sensible_kw,
            q_latent_kw,
            q_total_kw,
            shr,
            moisture_g_per_s,
            valid,
        }
    }
}

/// 입출구 건구/습구온도 쌍으로 과정을 계산한다. 입출구 상태는 `(tdb, twb)` 이다.
pub fn compute_process(
    name: &str,
    inlet: (f64, f64),
    outlet: (f64, f64),
    vol_flow_m3_s: f64,
    pressure_pa: f64,
) -> Process {
    let s_in = compute_state(inlet.0, inlet.1, pressure_pa);
    let s_out = compute_state(outlet.0, outlet.1, pressure_pa);
    Process::from_states(name, &s_in, &s_out, vol_flow_m3_s)
}

/// 과정에 쓰는 풍량 계통.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowBasis {
    Ahu,
    Crah,
}

/// 표준 과정 정의: (과정 이름, 입구 상태, 출구 상태, 풍량 계통)
pub const STANDARD_PROCESSES: [(&str, &str, &str, FlowBasis); 6] = [
    ("Summer Max Cooling", states::OAT_MAX_N20, states::OC_MAX_COOL, FlowBasis::Ahu),
    ("Summer Enthalpy Cooling", states::OAT_MAX_04E, states::OC_ENTHALPY, FlowBasis::Ahu),
    ("Summer Dehumidification", states::OAT_MAX_04H, states::OC_DEHUM, FlowBasis::Ahu),
    ("CRAH Cooling Loop", states::CRAH_ON_COIL, states::CRAH_OFF_COIL, FlowBasis::Crah),
    ("Winter Heating", states::OAT_MIN_N20, states::OC_HEAT, FlowBasis::Ahu),
    ("Winter Min OAH Heating", states::OAT_MIN_04H, states::OC_HEAT, FlowBasis::Ahu),
];

/// 상태 맵과 시스템 풍량으로 여섯 개 표준 과정을 순서대로 계산한다.
///
/// 상태 맵에 없는 상태점을 참조하는 과정은 건너뛴다.
pub fn compute_processes(states: &IndexMap<String, AirState>, flows: &SystemFlows) -> Vec<Process> {
    STANDARD_PROCESSES
        .iter()
        .filter_map(|(name, from, to, basis)| {
            let (Some(inlet), Some(outlet)) = (states.get(*from), states.get(*to)) else {
                warn!(process = name, from, to, "상태점이 없어 과정을 건너뜀");
                return None;
            };
            let vol = match basis {
                FlowBasis::Ahu => flows.ahu_vol_flow_m3_s,
                FlowBasis::Crah => flows.crah_vol_flow_m3_s,
            };
            Some(Process::from_states(*name, inlet, outlet, vol))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: f64 = 101_325.0;

    #[test]
    fn identical_states_have_no_shr() {
        let p = compute_process("idle", (24.0, 17.0), (24.0, 17.0), 2.0, P);
        assert_eq!(p.q_total_kw, 0.0);
        assert_eq!(p.shr, None);
        assert_eq!(p.moisture_g_per_s, 0.0);
    }

    #[test]
    fn zero_flow_has_no_shr() {
        let p = compute_process("stopped", (35.0, 24.0), (13.0, 13.0), 0.0, P);
        assert_eq!(p.mdot_out, 0.0);
        assert_eq!(p.shr, None);
    }

    #[test]
    fn cooling_and_dehumidifying_signs() {
        let p = compute_process("cool", (35.0, 24.0), (13.0, 13.0), 2.0, P);
        assert!(p.valid);
        assert!(p.q_total_kw < 0.0);
        assert!(p.q_sensible_kw < 0.0);
        assert!(p.moisture_g_per_s > 0.0);
        assert_eq!(p.q_latent_kw, p.q_total_kw - p.q_sensible_kw);
        let shr = p.shr.unwrap();
        assert!(shr > 0.0 && shr < 1.0, "shr={shr}");
    }

    #[test]
    fn sensible_load_uses_inlet_cp_and_outlet_mass_flow() {
        let s_in = compute_state(7.3, 3.6, P);
        let s_out = compute_state(36.0, 15.8, P);
        let p = Process::from_states("heat", &s_in, &s_out, 1.5);
        let expected = 1.5 * s_out.moist_density() * (1.006 + 1.86 * s_in.w) * (36.0 - 7.3);
        assert_relative_eq!(p.q_sensible_kw, expected, epsilon = 1e-9);
        assert!(p.mdot_in > p.mdot_out);
    }

    #[test]
    fn approximated_endpoint_marks_process_invalid() {
        let p = compute_process("bad", (20.0, 25.0), (13.0, 13.0), 1.0, P);
        assert!(!p.valid);
        assert_eq!(p.q_latent_kw, p.q_total_kw - p.q_sensible_kw);
    }
}
