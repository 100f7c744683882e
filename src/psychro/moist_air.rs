//! ASHRAE Handbook Fundamentals(2017) 1장 습공기 관계식의 SI 구현.
//!
//! 단위: 온도 °C, 압력 Pa(절대압), 습도비 kg수증기/kg건공기, 비엔탈피 kJ/kg건공기.
//! 단위계는 SI 로 고정되어 있으며 전역 설정에 의존하지 않는다.

use serde::Serialize;
use thiserror::Error;

use crate::units::celsius_to_kelvin;

/// 건공기 기체상수 [J/(kg·K)]
pub const R_DA: f64 = 287.042;
/// 수증기/건공기 분자량비
pub const MOLAR_MASS_RATIO: f64 = 0.621945;
/// 습도비 하한 [kg/kg]
pub const MIN_HUM_RATIO: f64 = 1e-7;
/// 물의 삼중점 [°C]
pub const TRIPLE_POINT_WATER: f64 = 0.01;
/// 반복 계산 온도 허용오차 [°C]
pub const TEMPERATURE_TOLERANCE: f64 = 0.001;
/// 반복 계산 최대 횟수
pub const MAX_ITER_COUNT: usize = 100;
/// Hyland-Wexler 식 적용 범위 [°C]
pub const SAT_TEMPERATURE_BOUNDS: (f64, f64) = (-100.0, 200.0);

/// 습공기 물성 계산 중 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum PsychroError {
    /// Hyland-Wexler 적용 범위를 벗어난 온도
    #[error("온도 {0:.2} °C 가 계산 가능 범위(-100~200 °C)를 벗어났습니다")]
    TemperatureOutOfRange(f64),
    /// 습구온도가 건구온도보다 높음
    #[error("습구온도 {twb:.2} °C 가 건구온도 {tdb:.2} °C 보다 높습니다")]
    WetBulbAboveDryBulb { tdb: f64, twb: f64 },
    /// 대기압이 0 이하
    #[error("대기압은 0보다 커야 합니다 (입력 {0} Pa)")]
    NonPositivePressure(f64),
    /// 음수 습도비
    #[error("습도비가 음수입니다: {0}")]
    NegativeHumidityRatio(f64),
    /// 상대습도가 0~1 범위를 벗어남
    #[error("상대습도 {0} 는 0~1 범위여야 합니다")]
    RelativeHumidityOutOfRange(f64),
    /// 수증기 분압이 포화 범위 또는 전압을 벗어남
    #[error("수증기 분압 {0:.1} Pa 가 유효 범위를 벗어났습니다")]
    VapourPressureOutOfRange(f64),
    /// 반복 계산 미수렴
    #[error("{0} 반복 계산이 수렴하지 않았습니다")]
    NotConverged(&'static str),
    /// NaN/무한대 입력
    #[error("유한하지 않은 입력 값이 있습니다")]
    NonFinite,
}

fn check_finite(values: &[f64]) -> Result<(), PsychroError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(PsychroError::NonFinite)
    }
}

fn check_pressure(pressure_pa: f64) -> Result<(), PsychroError> {
    check_finite(&[pressure_pa])?;
    if pressure_pa <= 0.0 {
        return Err(PsychroError::NonPositivePressure(pressure_pa));
    }
    Ok(())
}

/// 포화 수증기압 [Pa]. Hyland-Wexler 식(ASHRAE 식 5, 6)을 사용한다.
///
/// 삼중점 이하에서는 얼음, 그 이상에서는 물에 대한 포화압을 반환한다.
pub fn sat_vap_pres(tdb: f64) -> Result<f64, PsychroError> {
    check_finite(&[tdb])?;
    let (lo, hi) = SAT_TEMPERATURE_BOUNDS;
    if !(lo..=hi).contains(&tdb) {
        return Err(PsychroError::TemperatureOutOfRange(tdb));
    }
    let t = celsius_to_kelvin(tdb);
    let ln_pws = if tdb <= TRIPLE_POINT_WATER {
        -5.674_535_9e3 / t + 6.392_524_7 - 9.677_843e-3 * t + 6.221_570_1e-7 * t * t
            + 2.074_782_5e-9 * t.powi(3)
            - 9.484_024e-13 * t.powi(4)
            + 4.163_501_9 * t.ln()
    } else {
        -5.800_220_6e3 / t + 1.391_499_3 - 4.864_023_9e-2 * t + 4.176_476_8e-5 * t * t
            - 1.445_209_3e-8 * t.powi(3)
            + 6.545_967_3 * t.ln()
    };
    Ok(ln_pws.exp())
}

/// ln(Pws) 의 온도 미분. 이슬점 Newton-Raphson 반복에 쓰인다.
fn d_ln_pws(tdb: f64) -> f64 {
    let t = celsius_to_kelvin(tdb);
    if tdb <= TRIPLE_POINT_WATER {
        5.674_535_9e3 / (t * t) - 9.677_843e-3 + 2.0 * 6.221_570_1e-7 * t
            + 3.0 * 2.074_782_5e-9 * t * t
            - 4.0 * 9.484_024e-13 * t.powi(3)
            + 4.163_501_9 / t
    } else {
        5.800_220_6e3 / (t * t) - 4.864_023_9e-2 + 2.0 * 4.176_476_8e-5 * t
            - 3.0 * 1.445_209_3e-8 * t * t
            + 6.545_967_3 / t
    }
}

/// 수증기 분압으로부터 습도비를 구한다.
pub fn hum_ratio_from_vap_pres(vap_pres: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    check_pressure(pressure_pa)?;
    check_finite(&[vap_pres])?;
    if vap_pres < 0.0 || vap_pres >= pressure_pa {
        return Err(PsychroError::VapourPressureOutOfRange(vap_pres));
    }
    let w = MOLAR_MASS_RATIO * vap_pres / (pressure_pa - vap_pres);
    Ok(w.max(MIN_HUM_RATIO))
}

/// 습도비로부터 수증기 분압[Pa]을 구한다.
pub fn vap_pres_from_hum_ratio(w: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    check_pressure(pressure_pa)?;
    check_finite(&[w])?;
    if w < 0.0 {
        return Err(PsychroError::NegativeHumidityRatio(w));
    }
    let w = w.max(MIN_HUM_RATIO);
    Ok(pressure_pa * w / (MOLAR_MASS_RATIO + w))
}

/// 포화 습도비 [kg/kg].
pub fn sat_hum_ratio(tdb: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    let p_ws = sat_vap_pres(tdb)?;
    hum_ratio_from_vap_pres(p_ws, pressure_pa)
}

/// 건구/습구온도로부터 습도비를 구한다 (ASHRAE 식 33, 35).
pub fn hum_ratio_from_wet_bulb(tdb: f64, twb: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    check_finite(&[tdb, twb])?;
    if twb > tdb {
        return Err(PsychroError::WetBulbAboveDryBulb { tdb, twb });
    }
    let ws_star = sat_hum_ratio(twb, pressure_pa)?;
    let w = if twb >= 0.0 {
        ((2501.0 - 2.326 * twb) * ws_star - 1.006 * (tdb - twb))
            / (2501.0 + 1.86 * tdb - 4.186 * twb)
    } else {
        ((2830.0 - 0.24 * twb) * ws_star - 1.006 * (tdb - twb))
            / (2830.0 + 1.86 * tdb - 2.1 * twb)
    };
    Ok(w.max(MIN_HUM_RATIO))
}

/// 상대습도(0~1)로부터 습도비를 구한다.
pub fn hum_ratio_from_rel_hum(tdb: f64, rh: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    check_finite(&[rh])?;
    if !(0.0..=1.0).contains(&rh) {
        return Err(PsychroError::RelativeHumidityOutOfRange(rh));
    }
    let vap_pres = rh * sat_vap_pres(tdb)?;
    hum_ratio_from_vap_pres(vap_pres, pressure_pa)
}

/// 습도비로부터 상대습도(0~1)를 구한다. 포화 부근에서는 1을 약간 넘을 수 있다.
pub fn rel_hum_from_hum_ratio(tdb: f64, w: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    let vap_pres = vap_pres_from_hum_ratio(w, pressure_pa)?;
    Ok(vap_pres / sat_vap_pres(tdb)?)
}

/// 수증기 분압으로부터 이슬점을 구한다.
///
/// ln(Pws) 를 Newton-Raphson 으로 역산하며, 결과는 적용 범위와 건구온도로 제한한다.
pub fn dew_point_from_vap_pres(tdb: f64, vap_pres: f64) -> Result<f64, PsychroError> {
    check_finite(&[tdb, vap_pres])?;
    let (lo, hi) = SAT_TEMPERATURE_BOUNDS;
    if vap_pres < sat_vap_pres(lo)? || vap_pres > sat_vap_pres(hi)? {
        return Err(PsychroError::VapourPressureOutOfRange(vap_pres));
    }
    let ln_vp = vap_pres.ln();
    // 초기값은 건구온도. 범위를 벗어나면 경계로 당긴다.
    let mut tdp = tdb.clamp(lo, hi);
    for _ in 0..=MAX_ITER_COUNT {
        let prev = tdp;
        let ln_vp_iter = sat_vap_pres(prev)?.ln();
        tdp = (prev - (ln_vp_iter - ln_vp) / d_ln_pws(prev)).clamp(lo, hi);
        if (tdp - prev).abs() <= TEMPERATURE_TOLERANCE {
            return Ok(tdp.min(tdb));
        }
    }
    Err(PsychroError::NotConverged("이슬점"))
}

/// 건구온도와 습도비로부터 이슬점을 구한다.
pub fn dew_point_from_hum_ratio(tdb: f64, w: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    let vap_pres = vap_pres_from_hum_ratio(w, pressure_pa)?;
    dew_point_from_vap_pres(tdb, vap_pres)
}

/// 이슬점으로부터 습도비를 구한다.
pub fn hum_ratio_from_dew_point(tdp: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    let vap_pres = sat_vap_pres(tdp)?;
    hum_ratio_from_vap_pres(vap_pres, pressure_pa)
}

/// 건구온도와 습도비로부터 습구온도를 구한다.
///
/// 이슬점과 건구온도 사이를 이분법으로 좁혀 [`hum_ratio_from_wet_bulb`] 가 주어진 습도비와
/// 일치하는 습구온도를 찾는다.
pub fn wet_bulb_from_hum_ratio(tdb: f64, w: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    check_finite(&[tdb, w])?;
    if w < 0.0 {
        return Err(PsychroError::NegativeHumidityRatio(w));
    }
    let bounded_w = w.max(MIN_HUM_RATIO);
    let mut lower = dew_point_from_hum_ratio(tdb, bounded_w, pressure_pa)?;
    let mut upper = tdb;
    let mut twb = 0.5 * (lower + upper);
    let mut iterations = 1;
    while upper - lower > TEMPERATURE_TOLERANCE {
        if hum_ratio_from_wet_bulb(tdb, twb, pressure_pa)? > bounded_w {
            upper = twb;
        } else {
            lower = twb;
        }
        twb = 0.5 * (lower + upper);
        if iterations >= MAX_ITER_COUNT {
            return Err(PsychroError::NotConverged("습구온도"));
        }
        iterations += 1;
    }
    Ok(twb)
}

/// 습공기 비엔탈피 [kJ/kg건공기]: h = 1.006·T + W·(2501 + 1.86·T)
pub fn moist_air_enthalpy(tdb: f64, w: f64) -> f64 {
    let w = w.max(MIN_HUM_RATIO);
    1.006 * tdb + w * (2501.0 + 1.86 * tdb)
}

/// 습공기 정압비열 [kJ/(kg·K)]: cp = 1.006 + 1.86·W
pub fn moist_air_cp(w: f64) -> f64 {
    1.006 + 1.86 * w
}

/// 습공기 비체적 [m³/kg건공기]: v = R_da · T · (1 + 1.607858·W) / p
pub fn moist_air_volume(tdb: f64, w: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    check_pressure(pressure_pa)?;
    check_finite(&[tdb, w])?;
    if w < 0.0 {
        return Err(PsychroError::NegativeHumidityRatio(w));
    }
    let w = w.max(MIN_HUM_RATIO);
    Ok(R_DA * celsius_to_kelvin(tdb) * (1.0 + 1.607_858 * w) / pressure_pa)
}

/// 습공기 밀도 [kg습공기/m³]: ρ = (1 + W) / v
pub fn moist_air_density(tdb: f64, w: f64, pressure_pa: f64) -> Result<f64, PsychroError> {
    let v = moist_air_volume(tdb, w, pressure_pa)?;
    Ok((1.0 + w.max(MIN_HUM_RATIO)) / v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn saturation_pressure_matches_ashrae_table() {
        // ASHRAE Fundamentals 1장 표 3
        assert_relative_eq!(sat_vap_pres(20.0).unwrap(), 2339.2, max_relative = 1e-3);
        assert_relative_eq!(sat_vap_pres(-20.0).unwrap(), 103.24, max_relative = 1e-3);
        assert_relative_eq!(sat_vap_pres(100.0).unwrap(), 101_418.0, max_relative = 1e-3);
    }

    #[test]
    fn saturation_pressure_rejects_out_of_range() {
        assert_eq!(
            sat_vap_pres(250.0),
            Err(PsychroError::TemperatureOutOfRange(250.0))
        );
    }

    #[test]
    fn wet_bulb_above_dry_bulb_is_rejected() {
        assert!(matches!(
            hum_ratio_from_wet_bulb(20.0, 21.0, 101_325.0),
            Err(PsychroError::WetBulbAboveDryBulb { .. })
        ));
    }

    #[test]
    fn dew_point_inverts_saturation_pressure() {
        let w = hum_ratio_from_dew_point(12.0, 101_325.0).unwrap();
        let tdp = dew_point_from_hum_ratio(25.0, w, 101_325.0).unwrap();
        assert!((tdp - 12.0).abs() < 0.01, "tdp={tdp}");
    }

    #[test]
    fn wet_bulb_inverts_humidity_ratio() {
        let w = hum_ratio_from_wet_bulb(30.0, 21.0, 101_325.0).unwrap();
        let twb = wet_bulb_from_hum_ratio(30.0, w, 101_325.0).unwrap();
        assert!((twb - 21.0).abs() < 0.01, "twb={twb}");
    }

    #[test]
    fn below_freezing_wet_bulb_uses_ice_relation() {
        let w = hum_ratio_from_wet_bulb(-5.0, -7.0, 101_325.0).unwrap();
        assert!(w > 0.0 && w < 0.003, "w={w}");
    }

    #[test]
    fn non_positive_pressure_is_rejected() {
        assert_eq!(
            moist_air_volume(20.0, 0.01, 0.0),
            Err(PsychroError::NonPositivePressure(0.0))
        );
    }
}
