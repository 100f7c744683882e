//! 데이터센터 AHU 설계 계산.
//!
//! [`run_design`] 이 한 번의 계산 단위이다. 설정값 → 대기압 → (선택) 코일 출구 도출 →
//! 상태점 → 시스템 풍량 → 표준 과정 순서로 진행하며, 도출이나 풍량 단계의 오류는
//! [`DesignIssue`] 로 모아 나머지 결과와 함께 돌려준다.

pub mod off_coil;
pub mod process;
pub mod setpoints;
pub mod states;
pub mod system_flows;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::psychro::{AirState, SiteConditions};
pub use off_coil::{derive_off_coil, derive_off_coil_with, DerivationError, OffCoilDerivation, OffCoilInputs};
pub use process::{compute_process, compute_processes, Process};
pub use setpoints::{SetpointError, Setpoints};
pub use states::{build_states, PointGroup};
pub use system_flows::{compute_system_flows, FlowError, FlowSettings, SystemFlows};

/// 설계 계산 옵션. 설정 파일의 `[design]` 절이다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    /// 코일 출구 조건을 CRAH 설정값으로부터 자동 도출할지 여부
    pub auto_derive_off_coil: bool,
    pub cool_margin_c: f64,
    pub dehum_margin_c: f64,
    pub enthalpy_target_kj_per_kg: f64,
    pub flows: FlowSettings,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            auto_derive_off_coil: true,
            cool_margin_c: 2.0,
            dehum_margin_c: 4.0,
            enthalpy_target_kj_per_kg: 44.0,
            flows: FlowSettings::default(),
        }
    }
}

impl DesignSettings {
    /// 설정값에 이 옵션을 더해 코일 출구 도출 입력을 만든다. 동계 조건은 0.4%H 최저 외기이다.
    pub fn off_coil_inputs(&self, setpoints: &Setpoints, pressure_pa: f64) -> OffCoilInputs {
        OffCoilInputs {
            crah_off_tdb: setpoints.crah_off_tdb,
            crah_off_twb: setpoints.crah_off_twb,
            crah_on_tdb: setpoints.crah_on_tdb,
            winter_oat_tdb: setpoints.oat_min_04h_tdb,
            winter_oat_twb: setpoints.oat_min_04h_twb,
            cool_margin_c: self.cool_margin_c,
            dehum_margin_c: self.dehum_margin_c,
            enthalpy_target_kj_per_kg: self.enthalpy_target_kj_per_kg,
            pressure: pressure_pa,
        }
    }
}

/// 계산 단계 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DesignStage {
    OffCoilDerivation,
    SystemFlows,
}

/// 계산을 멈추지 않고 보고하는 단계별 문제.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignIssue {
    pub stage: DesignStage,
    pub message: String,
}

/// 한 번의 설계 계산 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignResult {
    pub site: SiteConditions,
    /// 도출값이 반영된 최종 설정값
    pub setpoints: Setpoints,
    pub derivation: Option<OffCoilDerivation>,
    pub states: IndexMap<String, AirState>,
    pub flows: Option<SystemFlows>,
    pub processes: Vec<Process>,
    pub issues: Vec<DesignIssue>,
}

impl DesignResult {
    /// 근사 상태로 채워진 상태점 이름들.
    pub fn approximated_states(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|(_, s)| !s.is_valid())
            .map(|(name, _)| name.as_str())
    }
}

/// 설계 계산 한 회를 수행한다.
///
/// 설정값 검증 실패만 오류로 돌려준다. 도출/풍량 단계의 오류는 `issues` 에 기록하고
/// 도출 실패 시에는 입력된 코일 출구 값을, 풍량 실패 시에는 과정 없이 진행한다.
pub fn run_design(setpoints: &Setpoints, settings: &DesignSettings) -> Result<DesignResult, SetpointError> {
    setpoints.validate()?;
    let site = SiteConditions::from_altitude(setpoints.altitude);
    let p = site.pressure_pa;
    let mut setpoints = setpoints.clone();
    let mut issues = Vec::new();

    let derivation = if settings.auto_derive_off_coil {
        match derive_off_coil(&settings.off_coil_inputs(&setpoints, p)) {
            Ok(derived) => {
                setpoints.apply_derivation(&derived);
                Some(derived)
            }
            Err(e) => {
                warn!(error = %e, "코일 출구 도출 실패, 입력값 유지");
                issues.push(DesignIssue {
                    stage: DesignStage::OffCoilDerivation,
                    message: e.to_string(),
                });
                None
            }
        }
    } else {
        None
    };

    let states = build_states(&setpoints, p);

    let flows = match compute_system_flows(
        setpoints.it_load,
        setpoints.ahu_vol_flow_override(),
        &states[states::CRAH_OFF_COIL],
        &states[states::CRAH_ON_COIL],
        &states[states::OC_DEHUM],
        p,
        &settings.flows,
    ) {
        Ok(flows) => Some(flows),
        Err(e) => {
            warn!(error = %e, "시스템 풍량 계산 실패");
            issues.push(DesignIssue {
                stage: DesignStage::SystemFlows,
                message: e.to_string(),
            });
            None
        }
    };

    let processes = flows
        .as_ref()
        .map(|f| compute_processes(&states, f))
        .unwrap_or_default();

    info!(
        altitude = site.altitude_m,
        pressure = p,
        states = states.len(),
        processes = processes.len(),
        issues = issues.len(),
        "설계 계산 완료"
    );

    Ok(DesignResult {
        site,
        setpoints,
        derivation,
        states,
        flows,
        processes,
        issues,
    })
}
