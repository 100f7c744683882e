//! ASHRAE Handbook of Fundamentals (2021, 14장) 설계 외기 조건 표.

use std::collections::HashMap;

use serde::Serialize;

/// 한 지역의 설계 외기 조건. 온도 °C, 고도 m.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignConditions {
    pub key: &'static str,
    pub location: &'static str,
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub timezone: i8,

    // 하계
    pub cooling_db_n20: f64,
    pub cooling_wb_n20: f64,
    pub cooling_db_04: f64,
    pub cooling_wb_04: f64,
    pub cooling_db_meanwb: f64,
    pub dehumid_db: f64,
    pub dehumid_wb: f64,

    // 동계
    pub heating_db_n20: f64,
    pub heating_db_004: f64,
    pub heating_db_meanwb: f64,
}

/// 동계 0.4%H 조건의 습구온도에 더하는 값 [°C]
pub const WINTER_04H_WB_OFFSET_C: f64 = 2.0;

impl DesignConditions {
    /// 설정값 필드 이름으로 된 평탄한 맵. [`crate::ahu::Setpoints::with_overrides`] 에 넘긴다.
    ///
    /// 난방 조건의 습구온도는 건구온도를 넘지 않도록 자른다(넘으면 포화).
    pub fn to_setpoint_map(&self) -> HashMap<String, f64> {
        [
            ("altitude", self.altitude_m),
            ("oat_n20_tdb", self.cooling_db_n20),
            ("oat_n20_twb", self.cooling_wb_n20),
            ("oat_04e_tdb", self.cooling_db_04),
            ("oat_04e_twb", self.cooling_wb_04),
            ("oat_04h_tdb", self.dehumid_db),
            ("oat_04h_twb", self.dehumid_wb),
            ("oat_min_n20_tdb", self.heating_db_n20),
            ("oat_min_n20_twb", self.heating_db_meanwb.min(self.heating_db_n20)),
            ("oat_min_04h_tdb", self.heating_db_004),
            (
                "oat_min_04h_twb",
                (self.heating_db_meanwb + WINTER_04H_WB_OFFSET_C).min(self.heating_db_004),
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

macro_rules! site {
    (
        $key:literal, $loc:literal, $country:literal,
        ($lat:expr, $lon:expr, $alt:expr, $tz:expr),
        cool: ($db_n20:expr, $wb_n20:expr, $db_04:expr, $wb_04:expr, $meanwb:expr),
        dehum: ($dh_db:expr, $dh_wb:expr),
        heat: ($h_n20:expr, $h_004:expr, $h_wb:expr) $(,)?
    ) => {
        DesignConditions {
            key: $key,
            location: $loc,
            country: $country,
            latitude: $lat,
            longitude: $lon,
            altitude_m: $alt,
            timezone: $tz,
            cooling_db_n20: $db_n20,
            cooling_wb_n20: $wb_n20,
            cooling_db_04: $db_04,
            cooling_wb_04: $wb_04,
            cooling_db_meanwb: $meanwb,
            dehumid_db: $dh_db,
            dehumid_wb: $dh_wb,
            heating_db_n20: $h_n20,
            heating_db_004: $h_004,
            heating_db_meanwb: $h_wb,
        }
    };
}

/// 사용자 정의 지역 키. 목록의 마지막에 온다.
pub const CUSTOM_KEY: &str = "CUSTOM";

pub static DESIGN_CONDITIONS: [DesignConditions; 14] = [
    site!("ABU DHABI", "Abu Dhabi", "UAE", (24.43, 54.65, 27.0, 4),
        cool: (47.0, 29.5, 45.2, 28.5, 35.2), dehum: (33.6, 30.2), heat: (7.3, 9.5, 14.7)),
    site!("DUBAI", "Dubai", "UAE", (25.25, 55.33, 5.0, 4),
        cool: (46.2, 30.8, 44.9, 30.0, 35.8), dehum: (34.2, 31.2), heat: (10.2, 12.0, 16.0)),
    site!("RIYADH", "Riyadh", "Saudi Arabia", (24.72, 46.73, 612.0, 3),
        cool: (44.7, 23.2, 43.0, 22.4, 32.0), dehum: (31.0, 22.8), heat: (3.2, 5.0, 9.5)),
    site!("JOHANNESBURG", "Johannesburg", "South Africa", (-26.13, 28.23, 1694.0, 2),
        cool: (32.2, 19.3, 30.8, 18.8, 24.5), dehum: (23.0, 19.0), heat: (1.4, 3.1, 8.5)),
    site!("CAPE TOWN", "Cape Town", "South Africa", (-33.97, 18.60, 42.0, 2),
        cool: (35.2, 21.0, 33.1, 20.4, 26.3), dehum: (24.8, 20.5), heat: (4.8, 6.2, 11.5)),
    site!("LONDON", "London", "UK", (51.48, -0.45, 25.0, 0),
        cool: (30.5, 21.0, 28.8, 20.2, 22.8), dehum: (21.0, 19.7), heat: (-3.5, -1.8, 4.0)),
    site!("FRANKFURT", "Frankfurt", "Germany", (50.03, 8.55, 113.0, 1),
        cool: (33.2, 21.5, 31.2, 21.0, 23.8), dehum: (22.5, 20.5), heat: (-10.0, -7.5, 2.0)),
    site!("SINGAPORE", "Singapore", "Singapore", (1.37, 103.98, 16.0, 8),
        cool: (34.0, 28.3, 33.1, 27.8, 30.1), dehum: (29.0, 28.1), heat: (22.3, 22.8, 25.0)),
    site!("SYDNEY", "Sydney", "Australia", (-33.95, 151.18, 6.0, 10),
        cool: (37.8, 24.5, 35.9, 23.5, 28.0), dehum: (26.2, 23.8), heat: (4.8, 6.3, 11.0)),
    site!("NEW YORK", "New York (JFK)", "USA", (40.63, -73.78, 9.0, -5),
        cool: (33.9, 25.9, 32.6, 25.2, 28.0), dehum: (26.8, 25.4), heat: (-11.2, -8.9, 2.0)),
    site!("CHICAGO", "Chicago O'Hare", "USA", (41.98, -87.90, 204.0, -6),
        cool: (34.4, 25.7, 32.6, 25.0, 28.1), dehum: (27.0, 25.2), heat: (-22.8, -19.2, -2.0)),
    site!("HONG KONG", "Hong Kong", "China", (22.32, 114.17, 9.0, 8),
        cool: (34.5, 28.5, 33.3, 28.1, 30.0), dehum: (29.2, 28.3), heat: (7.3, 8.8, 14.5)),
    site!("MUMBAI", "Mumbai", "India", (19.12, 72.85, 14.0, 5),
        cool: (37.0, 29.8, 35.2, 29.0, 31.5), dehum: (30.5, 29.2), heat: (14.5, 16.0, 20.0)),
    site!("CUSTOM", "Custom Location", "", (0.0, 0.0, 0.0, 0),
        cool: (45.0, 28.0, 40.0, 26.0, 32.0), dehum: (30.0, 26.0), heat: (5.0, 8.0, 12.0)),
];

/// 대소문자를 구분하지 않고 지역을 찾는다.
pub fn get_design_conditions(name: &str) -> Option<&'static DesignConditions> {
    let upper = name.trim().to_uppercase();
    DESIGN_CONDITIONS.iter().find(|dc| dc.key == upper)
}

/// 지역 키 목록. 이름순 정렬 후 `CUSTOM` 을 마지막에 둔다.
pub fn location_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = DESIGN_CONDITIONS
        .iter()
        .map(|dc| dc.key)
        .filter(|k| *k != CUSTOM_KEY)
        .collect();
    keys.sort_unstable();
    keys.push(CUSTOM_KEY);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let dc = get_design_conditions("abu dhabi").unwrap();
        assert_eq!(dc.location, "Abu Dhabi");
        assert!(get_design_conditions(" Hong Kong ").is_some());
        assert!(get_design_conditions("Atlantis").is_none());
    }

    #[test]
    fn custom_is_listed_last() {
        let keys = location_keys();
        assert_eq!(keys.len(), 14);
        assert_eq!(keys.first(), Some(&"ABU DHABI"));
        assert_eq!(keys.last(), Some(&CUSTOM_KEY));
    }

    #[test]
    fn winter_wet_bulb_offset_is_applied() {
        let map = get_design_conditions("SINGAPORE").unwrap().to_setpoint_map();
        assert_eq!(map["oat_min_04h_twb"], 22.8);
        let map = get_design_conditions("CUSTOM").unwrap().to_setpoint_map();
        assert_eq!(map["oat_min_n20_twb"], 5.0);
        assert_eq!(map["oat_min_04h_twb"], 8.0);
    }

    #[test]
    fn winter_wet_bulb_never_exceeds_dry_bulb() {
        for dc in &DESIGN_CONDITIONS {
            let map = dc.to_setpoint_map();
            assert!(map["oat_min_n20_twb"] <= map["oat_min_n20_tdb"], "{}", dc.key);
            assert!(map["oat_min_04h_twb"] <= map["oat_min_04h_tdb"], "{}", dc.key);
        }
        let map = get_design_conditions("LONDON").unwrap().to_setpoint_map();
        assert_eq!(map["oat_min_n20_twb"], -3.5);
        assert_eq!(map["oat_min_04h_twb"], -1.8);
        assert_eq!(map["oat_min_04h_tdb"], -1.8);
        assert_eq!(map["altitude"], 25.0);
        assert_eq!(map.len(), 11);
    }
}
