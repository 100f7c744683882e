//! 설계에 쓰는 16 개의 이름 있는 상태점.

use indexmap::IndexMap;
use serde::Serialize;

use super::setpoints::Setpoints;
use crate::psychro::AirState;

pub const ASHRAE_18_LOW: &str = "ASHRAE 18 Low";
pub const ASHRAE_18_HIGH: &str = "ASHRAE 18 High";
pub const ASHRAE_27_LOW: &str = "ASHRAE 27 Low";
pub const ASHRAE_27_HIGH: &str = "ASHRAE 27 High";
pub const CRAH_OFF_COIL: &str = "CRAH Off-Coil";
pub const CRAH_ON_COIL: &str = "CRAH On-Coil";
pub const OAT_MAX_N20: &str = "OAT Max N=20";
pub const OAT_MAX_04E: &str = "OAT Max 0.4%E";
pub const OAT_MAX_04H: &str = "OAT Max 0.4%H";
pub const OAT_MIN_N20: &str = "OAT Min N=20";
pub const OAT_MIN_04H: &str = "OAT Min 0.4%H";
pub const OC_MAX_COOL: &str = "OC Max Cool";
pub const OC_ENTHALPY: &str = "OC Enthalpy";
pub const OC_DEHUM: &str = "OC Dehum";
pub const OC_HEAT: &str = "OC Heat";
pub const RETURN_AIR: &str = "Return Air";

/// 상태점 분류. 선도 마커와 보고서 구분에 쓴다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointGroup {
    /// ASHRAE A1 권장 범위 꼭짓점
    Ashrae,
    Crah,
    /// 외기 설계 조건
    Outdoor,
    /// AHU 코일 출구
    OffCoil,
    ReturnAir,
}

impl PointGroup {
    /// 상태점 이름의 분류. 알 수 없는 이름이면 `None`.
    pub fn of(name: &str) -> Option<Self> {
        STATE_TABLE
            .iter()
            .find(|(n, ..)| *n == name)
            .map(|(_, group, _)| *group)
    }
}

type Selector = fn(&Setpoints) -> (f64, f64);

const STATE_TABLE: [(&str, PointGroup, Selector); 16] = [
    (ASHRAE_18_LOW, PointGroup::Ashrae, |s| (s.ash_tdb_low, s.ash_twb_low)),
    (ASHRAE_18_HIGH, PointGroup::Ashrae, |s| (s.ash_tdb_high, s.ash_twb_high)),
    (ASHRAE_27_LOW, PointGroup::Ashrae, |s| (s.ash_tdb_27_low, s.ash_twb_27_low)),
    (ASHRAE_27_HIGH, PointGroup::Ashrae, |s| (s.ash_tdb_27_high, s.ash_twb_27_high)),
    (CRAH_OFF_COIL, PointGroup::Crah, |s| (s.crah_off_tdb, s.crah_off_twb)),
    (CRAH_ON_COIL, PointGroup::Crah, |s| (s.crah_on_tdb, s.crah_on_twb)),
    (OAT_MAX_N20, PointGroup::Outdoor, |s| (s.oat_n20_tdb, s.oat_n20_twb)),
    (OAT_MAX_04E, PointGroup::Outdoor, |s| (s.oat_04e_tdb, s.oat_04e_twb)),
    (OAT_MAX_04H, PointGroup::Outdoor, |s| (s.oat_04h_tdb, s.oat_04h_twb)),
    (OAT_MIN_N20, PointGroup::Outdoor, |s| (s.oat_min_n20_tdb, s.oat_min_n20_twb)),
    (OAT_MIN_04H, PointGroup::Outdoor, |s| (s.oat_min_04h_tdb, s.oat_min_04h_twb)),
    (OC_MAX_COOL, PointGroup::OffCoil, |s| (s.oc_cool_tdb, s.oc_cool_twb)),
    (OC_ENTHALPY, PointGroup::OffCoil, |s| (s.oc_enth_tdb, s.oc_enth_twb)),
    (OC_DEHUM, PointGroup::OffCoil, |s| (s.oc_dehum_tdb, s.oc_dehum_twb)),
    (OC_HEAT, PointGroup::OffCoil, |s| (s.oc_heat_tdb, s.oc_heat_twb)),
    (RETURN_AIR, PointGroup::ReturnAir, |s| (s.ra_tdb, s.ra_twb)),
];

/// 설정값으로부터 모든 상태점을 정해진 순서로 계산한다.
///
/// 계산이 불가능한 상태점도 근사 상태로 포함되므로 결과는 항상 16 개이다.
pub fn build_states(setpoints: &Setpoints, pressure_pa: f64) -> IndexMap<String, AirState> {
    STATE_TABLE
        .iter()
        .map(|(name, _, select)| {
            let (tdb, twb) = select(setpoints);
            (name.to_string(), AirState::new(*name, tdb, twb, pressure_pa))
        })
        .collect()
}
