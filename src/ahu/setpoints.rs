//! 설정값(setpoint) 입력 계약.
//!
//! 외부에서는 `crah_off_tdb`, `oat_n20_twb`, `altitude`, `it_load` 와 같은 이름의 평탄한
//! 숫자 맵으로 전달되며, 경계에서 타입이 있는 [`Setpoints`] 로 변환·검증한다.
//! 수동 입력과 기상 데이터 출처는 같은 필드 이름을 쓴다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::off_coil::OffCoilDerivation;

/// 고도 입력 허용 범위 [m]
pub const ALTITUDE_RANGE_M: (f64, f64) = (0.0, 5000.0);

/// 설정값 변환/검증 오류.
#[derive(Debug, Error)]
pub enum SetpointError {
    /// 숫자가 아닌 값 또는 NaN/무한대
    #[error("설정값 `{0}` 이(가) 유한한 숫자가 아닙니다")]
    NonFinite(String),
    /// 범위를 벗어난 값
    #[error("설정값 `{field}` = {value} 이(가) 허용 범위 {min} ~ {max} 를 벗어났습니다")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// 평탄한 맵을 구조체로 변환하지 못함
    #[error("설정값 변환 오류: {0}")]
    Decode(#[from] toml::de::Error),
    /// 구조체를 평탄한 맵으로 변환하지 못함
    #[error("설정값 직렬화 오류: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// 한 번의 계산에 필요한 모든 설정값. 온도 °C, 부하 kW, 고도 m, 풍량 m³/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Setpoints {
    pub altitude: f64,
    pub it_load: f64,
    /// AHU 풍량 지정값 [m³/s]. 0 이면 CRAH 풍량으로부터 자동 산정한다.
    pub ahu_vol_flow: f64,

    // ASHRAE A1 권장 범위 꼭짓점
    pub ash_tdb_low: f64,
    pub ash_twb_low: f64,
    pub ash_tdb_high: f64,
    pub ash_twb_high: f64,
    pub ash_tdb_27_low: f64,
    pub ash_twb_27_low: f64,
    pub ash_tdb_27_high: f64,
    pub ash_twb_27_high: f64,

    // CRAH
    pub crah_off_tdb: f64,
    pub crah_off_twb: f64,
    pub crah_on_tdb: f64,
    pub crah_on_twb: f64,

    // 외기 설계 조건
    pub oat_n20_tdb: f64,
    pub oat_n20_twb: f64,
    pub oat_04e_tdb: f64,
    pub oat_04e_twb: f64,
    pub oat_04h_tdb: f64,
    pub oat_04h_twb: f64,
    pub oat_min_n20_tdb: f64,
    pub oat_min_n20_twb: f64,
    pub oat_min_04h_tdb: f64,
    pub oat_min_04h_twb: f64,

    // AHU 코일 출구
    pub oc_cool_tdb: f64,
    pub oc_cool_twb: f64,
    pub oc_enth_tdb: f64,
    pub oc_enth_twb: f64,
    pub oc_dehum_tdb: f64,
    pub oc_dehum_twb: f64,
    pub oc_heat_tdb: f64,
    pub oc_heat_twb: f64,

    // 환기(Return Air)
    pub ra_tdb: f64,
    pub ra_twb: f64,
}

impl Default for Setpoints {
    fn default() -> Self {
        Self {
            altitude: 22.0,
            it_load: 1500.0,
            ahu_vol_flow: 0.0,
            ash_tdb_low: 18.0,
            ash_twb_low: 6.4,
            ash_tdb_high: 18.0,
            ash_twb_high: 14.4,
            ash_tdb_27_low: 27.0,
            ash_twb_27_low: 10.27,
            ash_tdb_27_high: 27.0,
            ash_twb_27_high: 13.2,
            crah_off_tdb: 25.0,
            crah_off_twb: 16.5,
            crah_on_tdb: 36.0,
            crah_on_twb: 19.8,
            oat_n20_tdb: 49.2,
            oat_n20_twb: 32.9,
            oat_04e_tdb: 35.2,
            oat_04e_twb: 30.75,
            oat_04h_tdb: 33.6,
            oat_04h_twb: 30.2,
            oat_min_n20_tdb: 7.3,
            oat_min_n20_twb: 3.6,
            oat_min_04h_tdb: 31.1,
            oat_min_04h_twb: 14.7,
            oc_cool_tdb: 12.9,
            oc_cool_twb: 12.9,
            oc_enth_tdb: 14.55,
            oc_enth_twb: 14.55,
            oc_dehum_tdb: 15.0,
            oc_dehum_twb: 15.0,
            oc_heat_tdb: 36.0,
            oc_heat_twb: 15.82,
            ra_tdb: 35.0,
            ra_twb: 25.0,
        }
    }
}

impl Setpoints {
    /// 평탄한 이름→값 맵으로부터 설정값을 만든다.
    ///
    /// 알 수 없는 키는 무시하고, 빠진 키는 기본값을 쓴다. 결과는 검증을 거친다.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self, SetpointError> {
        Self::default().with_overrides(map)
    }

    /// 현재 값 위에 맵의 값을 덮어쓴 새 설정값을 돌려준다.
    pub fn with_overrides(&self, map: &HashMap<String, f64>) -> Result<Self, SetpointError> {
        let mut table = self.to_table()?;
        for (key, value) in map {
            if !value.is_finite() {
                return Err(SetpointError::NonFinite(key.clone()));
            }
            if table.contains_key(key) {
                table.insert(key.clone(), toml::Value::Float(*value));
            }
        }
        let merged: Setpoints = toml::Value::Table(table).try_into()?;
        merged.validate()?;
        Ok(merged)
    }

    /// TOML 문서(평탄한 키 = 숫자 테이블)로부터 설정값을 읽는다.
    pub fn from_toml_str(content: &str) -> Result<Self, SetpointError> {
        let parsed: Setpoints = toml::from_str(content)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// 설정값을 평탄한 이름→값 맵으로 내보낸다.
    pub fn to_map(&self) -> Result<HashMap<String, f64>, SetpointError> {
        Ok(self
            .to_table()?
            .into_iter()
            .filter_map(|(k, v)| v.as_float().map(|f| (k, f)))
            .collect())
    }

    fn to_table(&self) -> Result<toml::Table, SetpointError> {
        Ok(toml::Table::try_from(self)?)
    }

    /// 경계 검증. 유한성, 고도, 부하, 풍량 범위를 확인한다.
    ///
    /// 건구/습구 조합의 물리적 타당성은 여기서 거르지 않는다. 그런 상태는 근사 상태로
    /// 표시되고 나머지 계산은 계속된다.
    pub fn validate(&self) -> Result<(), SetpointError> {
        for (key, value) in self.to_map()? {
            if !value.is_finite() {
                return Err(SetpointError::NonFinite(key));
            }
        }
        let (alt_min, alt_max) = ALTITUDE_RANGE_M;
        if !(alt_min..=alt_max).contains(&self.altitude) {
            return Err(SetpointError::OutOfRange {
                field: "altitude",
                value: self.altitude,
                min: alt_min,
                max: alt_max,
            });
        }
        if self.it_load < 0.0 {
            return Err(SetpointError::OutOfRange {
                field: "it_load",
                value: self.it_load,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if self.ahu_vol_flow < 0.0 {
            return Err(SetpointError::OutOfRange {
                field: "ahu_vol_flow",
                value: self.ahu_vol_flow,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        Ok(())
    }

    /// 자동 도출된 코일 출구 조건을 반영한다.
    pub fn apply_derivation(&mut self, derived: &OffCoilDerivation) {
        self.oc_cool_tdb = derived.oc_cool_tdb;
        self.oc_cool_twb = derived.oc_cool_twb;
        self.oc_dehum_tdb = derived.oc_dehum_tdb;
        self.oc_dehum_twb = derived.oc_dehum_twb;
        self.oc_enth_tdb = derived.oc_enth_tdb;
        self.oc_enth_twb = derived.oc_enth_twb;
        self.oc_heat_tdb = derived.oc_heat_tdb;
        self.oc_heat_twb = derived.oc_heat_twb;
    }

    /// AHU 풍량 지정값. 0 이하이면 `None`(자동 산정).
    pub fn ahu_vol_flow_override(&self) -> Option<f64> {
        (self.ahu_vol_flow > 0.0).then_some(self.ahu_vol_flow)
    }
}
