//! 시간별 기상 자료(건구온도, 이슬점)로부터 ASHRAE 방식의 설계 외기 조건을 산출한다.
//!
//! 자료 수집(재분석 자료 다운로드, 지오코딩)은 이 모듈의 범위가 아니다. 호출자가 시간별
//! 표본을 넘기면 백분위수와 동시발생(coincident) 평균을 계산해 설정값 필드 맵으로 돌려준다.

use std::collections::HashMap;

use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};
use thiserror::Error;
use tracing::debug;

use crate::ahu::off_coil::round_to;
use crate::psychro::moist_air;
use crate::units::altitude_to_pressure;

/// 계산에 필요한 최소 유효 표본 수
pub const MIN_SAMPLES: usize = 1000;
/// 냉방 동시발생 습구온도: 백분위 건구온도 − 1.0 °C 이상인 시간의 평균
pub const COOLING_COINCIDENT_WINDOW_C: f64 = 1.0;
/// 제습 동시발생 건구온도: 백분위 습구온도 − 0.5 °C 이상인 시간의 평균
pub const DEHUM_COINCIDENT_WINDOW_C: f64 = 0.5;
/// 난방 평균 습구온도: 0.4% 건구온도 + 1.0 °C 이하인 시간의 평균
pub const HEATING_COINCIDENT_WINDOW_C: f64 = 1.0;
/// 동계 0.4%H 조건 습구온도에 더하는 값 [°C]
pub const WINTER_04H_WB_OFFSET_C: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PercentileError {
    #[error("유효 표본이 {found} 개로 최소 {required} 개보다 적습니다")]
    InsufficientData { found: usize, required: usize },
    #[error("건구온도({tdb}) 와 이슬점({tdp}) 표본 수가 다릅니다")]
    LengthMismatch { tdb: usize, tdp: usize },
}

/// 한 시간의 기상 표본.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample {
    pub tdb: f64,
    pub tdp: f64,
}

/// 백분위 분석 결과. 값은 0.1 °C 단위로 반올림된다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileConditions {
    pub altitude_m: f64,
    pub samples: usize,
    /// 99.6% 건구온도와 동시발생 습구온도
    pub cooling_db_996: f64,
    pub cooling_wb_996: f64,
    /// 99.0% 건구온도와 동시발생 습구온도
    pub cooling_db_990: f64,
    pub cooling_wb_990: f64,
    /// 99.6% 습구온도와 동시발생 건구온도
    pub dehumid_wb_996: f64,
    pub dehumid_db_996: f64,
    /// 0.4% / 1.0% 건구온도
    pub heating_db_004: f64,
    pub heating_db_010: f64,
    /// 난방 설계 조건의 평균 습구온도
    pub heating_wb_mean: f64,
}

impl PercentileConditions {
    /// 설정값 필드 이름으로 된 평탄한 맵. 습구온도는 짝이 되는 건구온도를 넘지 않는다.
    pub fn to_setpoint_map(&self) -> HashMap<String, f64> {
        [
            ("altitude", self.altitude_m),
            ("oat_n20_tdb", self.cooling_db_996),
            ("oat_n20_twb", self.cooling_wb_996),
            ("oat_04e_tdb", self.cooling_db_990),
            ("oat_04e_twb", self.cooling_wb_990),
            ("oat_04h_tdb", self.dehumid_db_996),
            ("oat_04h_twb", self.dehumid_wb_996.min(self.dehumid_db_996)),
            ("oat_min_n20_tdb", self.heating_db_004),
            ("oat_min_n20_twb", self.heating_wb_mean.min(self.heating_db_004)),
            ("oat_min_04h_tdb", self.heating_db_010),
            (
                "oat_min_04h_twb",
                (self.heating_wb_mean + WINTER_04H_WB_OFFSET_C).min(self.heating_db_010),
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// Stull(2011) 습구온도 경험식. 상대습도[%]는 Magnus 식으로 이슬점에서 구한다.
pub fn stull_wet_bulb(tdb: f64, tdp: f64) -> f64 {
    let magnus = |t: f64| 17.625 * t / (243.04 + t);
    let rh = 100.0 * (magnus(tdp) - magnus(tdb)).exp();
    tdb * (0.151_977 * (rh + 8.313_659).sqrt()).atan() + (tdb + rh).atan()
        - (rh - 1.676_331).atan()
        + 0.003_918_38 * rh.powf(1.5) * (0.023_101 * rh).atan()
        - 4.686_035
}

/// 이슬점으로부터 습구온도. 습공기 관계식이 실패하면 경험식을 쓴다.
pub fn wet_bulb_from_dew_point(tdb: f64, tdp: f64, pressure_pa: f64) -> f64 {
    moist_air::hum_ratio_from_dew_point(tdp, pressure_pa)
        .and_then(|w| moist_air::wet_bulb_from_hum_ratio(tdb, w, pressure_pa))
        .unwrap_or_else(|_| stull_wet_bulb(tdb, tdp))
}

fn percentile(values: &[f64], pct: f64) -> f64 {
    Data::new(values.to_vec()).quantile(pct / 100.0)
}

fn mean_where(values: &[f64], keys: &[f64], keep: impl Fn(f64) -> bool) -> Option<f64> {
    let selected: Vec<f64> = values
        .iter()
        .zip(keys)
        .filter(|(_, k)| keep(**k))
        .map(|(v, _)| *v)
        .collect();
    (!selected.is_empty()).then(|| selected.mean())
}

/// 건구온도/이슬점 배열로부터 설계 조건을 산출한다. NaN 을 포함한 시간은 버린다.
pub fn compute_percentile_conditions(
    tdb: &[f64],
    tdp: &[f64],
    altitude_m: f64,
) -> Result<PercentileConditions, PercentileError> {
    if tdb.len() != tdp.len() {
        return Err(PercentileError::LengthMismatch {
            tdb: tdb.len(),
            tdp: tdp.len(),
        });
    }
    let samples: Vec<HourlySample> = tdb
        .iter()
        .zip(tdp)
        .filter(|(t, d)| t.is_finite() && d.is_finite())
        .map(|(&tdb, &tdp)| HourlySample { tdb, tdp })
        .collect();
    compute_from_samples(&samples, altitude_m)
}

/// [`HourlySample`] 목록으로부터 설계 조건을 산출한다.
pub fn compute_from_samples(
    samples: &[HourlySample],
    altitude_m: f64,
) -> Result<PercentileConditions, PercentileError> {
    let valid: Vec<HourlySample> = samples
        .iter()
        .copied()
        .filter(|s| s.tdb.is_finite() && s.tdp.is_finite())
        .collect();
    if valid.len() < MIN_SAMPLES {
        return Err(PercentileError::InsufficientData {
            found: valid.len(),
            required: MIN_SAMPLES,
        });
    }

    let p = altitude_to_pressure(altitude_m);
    let tdb: Vec<f64> = valid.iter().map(|s| s.tdb).collect();
    let twb: Vec<f64> = valid
        .iter()
        .map(|s| wet_bulb_from_dew_point(s.tdb, s.tdp, p))
        .collect();

    let cool_996 = percentile(&tdb, 99.6);
    let cool_990 = percentile(&tdb, 99.0);
    let coincident_wb = |db: f64| {
        mean_where(&twb, &tdb, |t| t >= db - COOLING_COINCIDENT_WINDOW_C).unwrap_or(db - 5.0)
    };
    let wb_996 = coincident_wb(cool_996);
    let wb_990 = coincident_wb(cool_990);

    let dehum_wb = percentile(&twb, 99.6);
    let dehum_db = mean_where(&tdb, &twb, |w| w >= dehum_wb - DEHUM_COINCIDENT_WINDOW_C)
        .unwrap_or(dehum_wb + 3.0);

    let heat_004 = percentile(&tdb, 0.4);
    let heat_010 = percentile(&tdb, 1.0);
    let wb_winter = mean_where(&twb, &tdb, |t| t <= heat_004 + HEATING_COINCIDENT_WINDOW_C)
        .unwrap_or(heat_004 - 2.0);

    let result = PercentileConditions {
        altitude_m,
        samples: valid.len(),
        cooling_db_996: round_to(cool_996, 1),
        cooling_wb_996: round_to(wb_996, 1),
        cooling_db_990: round_to(cool_990, 1),
        cooling_wb_990: round_to(wb_990, 1),
        dehumid_wb_996: round_to(dehum_wb, 1),
        dehumid_db_996: round_to(dehum_db, 1),
        heating_db_004: round_to(heat_004, 1),
        heating_db_010: round_to(heat_010, 1),
        heating_wb_mean: round_to(wb_winter, 1),
    };
    debug!(?result, "백분위 설계 조건 산출 완료");
    Ok(result)
}
