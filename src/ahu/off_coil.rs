//! AHU 코일 출구 조건 자동 도출.
//!
//! CRAH 설정값과 여유값으로부터 최대냉각/제습/엔탈피/가열 네 가지 코일 출구 조건을
//! 도출한다. 냉각 계열 세 조건은 모두 포화 상태(Tdb = Twb)이다.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::psychro::moist_air::{self, PsychroError};
use crate::solver::{Brent, RootSolver, SolveError};

/// 엔탈피 목표 포화점 탐색 구간 [°C]
pub const ENTHALPY_SEARCH_BRACKET_C: (f64, f64) = (0.0, 30.0);
/// 엔탈피 목표 포화점 탐색 허용오차 [°C]
pub const ENTHALPY_SEARCH_XTOL_C: f64 = 0.01;
/// 탐색 실패 시 사용하는 엔탈피 코일 출구 건구온도 [°C]
pub const ENTHALPY_FALLBACK_TDB_C: f64 = 14.55;

/// 코일 출구 도출 중 발생 가능한 오류. 모두 설정 수준의 오류이다.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DerivationError {
    /// 대기압이 0 이하이거나 유한하지 않음
    #[error("대기압이 올바르지 않습니다: {0} Pa")]
    InvalidPressure(f64),
    /// 음수 여유값
    #[error("{name} 여유값은 음수일 수 없습니다 (입력 {value} °C)")]
    NegativeMargin { name: &'static str, value: f64 },
    /// 유한하지 않은 입력
    #[error("입력 `{0}` 이(가) 유한하지 않습니다")]
    NonFinite(&'static str),
    /// 상태 계산 실패
    #[error("{context} 상태를 계산할 수 없습니다: {source}")]
    State {
        context: &'static str,
        #[source]
        source: PsychroError,
    },
}

/// 코일 출구 도출 입력.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffCoilInputs {
    /// CRAH 코일 출구 건구/습구온도 [°C]
    pub crah_off_tdb: f64,
    pub crah_off_twb: f64,
    /// CRAH 코일 입구 건구온도 [°C]
    pub crah_on_tdb: f64,
    /// 동계 외기 설계 건구/습구온도 [°C]
    pub winter_oat_tdb: f64,
    pub winter_oat_twb: f64,
    /// 최대냉각 여유값: CRAH 이슬점 + margin [°C]
    pub cool_margin_c: f64,
    /// 제습 여유값: CRAH 이슬점 + margin [°C]
    pub dehum_margin_c: f64,
    /// 엔탈피 코일 출구 목표 [kJ/kg]
    pub enthalpy_target_kj_per_kg: f64,
    /// 대기압 [Pa]
    pub pressure: f64,
}

/// 도출 결과 및 진단값.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffCoilDerivation {
    pub oc_cool_tdb: f64,
    pub oc_cool_twb: f64,
    pub oc_dehum_tdb: f64,
    pub oc_dehum_twb: f64,
    pub oc_enth_tdb: f64,
    pub oc_enth_twb: f64,
    pub oc_heat_tdb: f64,
    pub oc_heat_twb: f64,
    /// CRAH 코일 출구 이슬점 [°C]
    pub crah_off_tdp: f64,
    pub cool_margin_c: f64,
    pub dehum_margin_c: f64,
    pub enthalpy_target_kj_per_kg: f64,
    /// 엔탈피 목표 탐색이 수렴했는지. `false` 이면 대체값을 사용했다.
    pub enthalpy_converged: bool,
}

/// 소수점 `digits` 자리로 반올림한다. 화면 입력 필드와 같은 자릿수를 맞춘다.
pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

fn state_err(context: &'static str) -> impl Fn(PsychroError) -> DerivationError {
    move |source| DerivationError::State { context, source }
}

/// 포화 공기의 엔탈피가 `target` 이 되는 건구온도를 찾는다.
pub fn saturated_tdb_for_enthalpy(
    target_kj_per_kg: f64,
    pressure: f64,
    solver: &dyn RootSolver,
) -> Result<f64, SolveError> {
    let residual = |t: f64| match moist_air::sat_hum_ratio(t, pressure) {
        Ok(w) => moist_air::moist_air_enthalpy(t, w) - target_kj_per_kg,
        Err(_) => f64::NAN,
    };
    let (lower, upper) = ENTHALPY_SEARCH_BRACKET_C;
    solver.solve(&residual, lower, upper)
}

fn validate(inputs: &OffCoilInputs) -> Result<(), DerivationError> {
    let fields = [
        ("crah_off_tdb", inputs.crah_off_tdb),
        ("crah_off_twb", inputs.crah_off_twb),
        ("crah_on_tdb", inputs.crah_on_tdb),
        ("winter_oat_tdb", inputs.winter_oat_tdb),
        ("winter_oat_twb", inputs.winter_oat_twb),
        ("cool_margin_c", inputs.cool_margin_c),
        ("dehum_margin_c", inputs.dehum_margin_c),
        ("enthalpy_target_kj_per_kg", inputs.enthalpy_target_kj_per_kg),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(DerivationError::NonFinite(name));
    }
    if !inputs.pressure.is_finite() || inputs.pressure <= 0.0 {
        return Err(DerivationError::InvalidPressure(inputs.pressure));
    }
    if inputs.cool_margin_c < 0.0 {
        return Err(DerivationError::NegativeMargin {
            name: "최대냉각",
            value: inputs.cool_margin_c,
        });
    }
    if inputs.dehum_margin_c < 0.0 {
        return Err(DerivationError::NegativeMargin {
            name: "제습",
            value: inputs.dehum_margin_c,
        });
    }
    Ok(())
}

/// 기본 근 찾기(Brent, 0~30 °C, 0.01 °C)로 코일 출구 조건을 도출한다.
pub fn derive_off_coil(inputs: &OffCoilInputs) -> Result<OffCoilDerivation, DerivationError> {
    let solver = Brent {
        xtol: ENTHALPY_SEARCH_XTOL_C,
        ..Brent::default()
    };
    derive_off_coil_with(inputs, &solver)
}

/// 지정한 근 찾기 알고리즘으로 코일 출구 조건을 도출한다.
pub fn derive_off_coil_with(
    inputs: &OffCoilInputs,
    solver: &dyn RootSolver,
) -> Result<OffCoilDerivation, DerivationError> {
    validate(inputs)?;
    let p = inputs.pressure;

    // 1. CRAH 코일 출구 이슬점
    let crah_w = moist_air::hum_ratio_from_wet_bulb(inputs.crah_off_tdb, inputs.crah_off_twb, p)
        .map_err(state_err("CRAH 코일 출구"))?;
    let crah_off_tdp = moist_air::dew_point_from_hum_ratio(inputs.crah_off_tdb, crah_w, p)
        .map_err(state_err("CRAH 코일 출구 이슬점"))?;

    // 2, 3. 최대냉각/제습: CRAH 이슬점 + 여유값의 포화점
    let oc_cool_tdb = round_to(crah_off_tdp + inputs.cool_margin_c, 1);
    let oc_dehum_tdb = round_to(crah_off_tdp + inputs.dehum_margin_c, 1);

    // 4. 목표 엔탈피의 포화점
    let (oc_enth_tdb, enthalpy_converged) =
        match saturated_tdb_for_enthalpy(inputs.enthalpy_target_kj_per_kg, p, solver) {
            Ok(t) => (round_to(t, 2), true),
            Err(e) => {
                warn!(
                    target_h = inputs.enthalpy_target_kj_per_kg,
                    error = %e,
                    fallback = ENTHALPY_FALLBACK_TDB_C,
                    "엔탈피 목표 포화점 탐색 실패, 대체값 사용"
                );
                (ENTHALPY_FALLBACK_TDB_C, false)
            }
        };

    // 5. 가열: 동계 외기 습도비를 유지한 채 CRAH 입구 건구온도까지 현열 가열
    let w_winter =
        moist_air::hum_ratio_from_wet_bulb(inputs.winter_oat_tdb, inputs.winter_oat_twb, p)
            .map_err(state_err("동계 외기"))?;
    let oc_heat_tdb = inputs.crah_on_tdb;
    let oc_heat_twb = moist_air::wet_bulb_from_hum_ratio(oc_heat_tdb, w_winter, p)
        .map_err(state_err("가열 코일 출구"))?;

    let derived = OffCoilDerivation {
        oc_cool_tdb,
        oc_cool_twb: oc_cool_tdb,
        oc_dehum_tdb,
        oc_dehum_twb: oc_dehum_tdb,
        oc_enth_tdb,
        oc_enth_twb: oc_enth_tdb,
        oc_heat_tdb,
        oc_heat_twb: round_to(oc_heat_twb, 2),
        crah_off_tdp: round_to(crah_off_tdp, 2),
        cool_margin_c: inputs.cool_margin_c,
        dehum_margin_c: inputs.dehum_margin_c,
        enthalpy_target_kj_per_kg: inputs.enthalpy_target_kj_per_kg,
        enthalpy_converged,
    };
    debug!(?derived, "코일 출구 조건 도출 완료");
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Bisection;

    fn inputs() -> OffCoilInputs {
        OffCoilInputs {
            crah_off_tdb: 25.0,
            crah_off_twb: 16.5,
            crah_on_tdb: 36.0,
            winter_oat_tdb: 31.1,
            winter_oat_twb: 14.7,
            cool_margin_c: 2.0,
            dehum_margin_c: 4.0,
            enthalpy_target_kj_per_kg: 44.0,
            pressure: 101_060.0,
        }
    }

    #[test]
    fn round_to_matches_display_precision() {
        assert_eq!(round_to(13.149, 1), 13.1);
        assert_eq!(round_to(15.8249, 2), 15.82);
    }

    #[test]
    fn negative_margin_fails_fast() {
        let mut i = inputs();
        i.dehum_margin_c = -1.0;
        assert!(matches!(
            derive_off_coil(&i),
            Err(DerivationError::NegativeMargin { value, .. }) if value == -1.0
        ));
    }

    #[test]
    fn non_positive_pressure_fails_fast() {
        let mut i = inputs();
        i.pressure = 0.0;
        assert_eq!(derive_off_coil(&i), Err(DerivationError::InvalidPressure(0.0)));
    }

    #[test]
    fn unreachable_enthalpy_target_uses_fallback() {
        let mut i = inputs();
        // 0~30 °C 포화 엔탈피 범위(약 9.5~100 kJ/kg)를 벗어난 목표
        i.enthalpy_target_kj_per_kg = 250.0;
        let d = derive_off_coil(&i).unwrap();
        assert!(!d.enthalpy_converged);
        assert_eq!(d.oc_enth_tdb, ENTHALPY_FALLBACK_TDB_C);
        assert_eq!(d.oc_enth_twb, ENTHALPY_FALLBACK_TDB_C);
    }

    #[test]
    fn bisection_and_brent_agree_within_tolerance() {
        let brent = derive_off_coil(&inputs()).unwrap();
        let bisect = derive_off_coil_with(&inputs(), &Bisection::default()).unwrap();
        assert!(brent.enthalpy_converged && bisect.enthalpy_converged);
        assert!((brent.oc_enth_tdb - bisect.oc_enth_tdb).abs() <= 0.02);
    }
}
