//! 외기 설계 조건 통합 테스트. 지역 표와 시간별 자료 CSV 가 설정값으로 이어지는지 확인한다.
use ahu_psychro_toolbox::ahu::{run_design, DesignSettings, Setpoints};
use ahu_psychro_toolbox::weather::{
    compute_from_samples, get_design_conditions, location_keys, read_hourly_csv, PercentileError,
};
use rstest::rstest;

#[rstest]
#[case("Abu Dhabi")]
#[case("  singapore ")]
#[case("CHICAGO")]
#[case("London")]
fn every_listed_location_feeds_a_complete_design(#[case] name: &str) {
    let dc = get_design_conditions(name).unwrap();
    let sp = Setpoints::default().with_overrides(&dc.to_setpoint_map()).unwrap();
    assert_eq!(sp.altitude, dc.altitude_m);
    assert_eq!(sp.oat_04h_twb, dc.dehumid_wb);
    assert_eq!(sp.oat_min_04h_twb, (dc.heating_db_meanwb + 2.0).min(dc.heating_db_004));

    let result = run_design(&sp, &DesignSettings::default()).unwrap();
    assert!(result.issues.is_empty(), "{name}: {:?}", result.issues);
    assert_eq!(result.processes.len(), 6);
}

#[test]
fn location_keys_cover_the_table() {
    let keys = location_keys();
    assert_eq!(keys.len(), 14);
    assert_eq!(keys.last(), Some(&"CUSTOM"));
    assert!(keys.iter().all(|k| get_design_conditions(k).is_some()));
}

/// 한 해 분량의 시간별 CSV. 여름 최고 36 °C, 겨울 최저 0 °C 부근이다.
fn synthetic_csv() -> String {
    let mut csv = String::from("time,tdb,tdp,wind\n");
    for h in 0..8760 {
        let day = h as f64 / 24.0;
        let season = -(2.0 * std::f64::consts::PI * day / 365.0).cos();
        let diurnal = (2.0 * std::f64::consts::PI * (h % 24) as f64 / 24.0).sin();
        let tdb = 18.0 + 13.0 * season + 5.0 * diurnal;
        let tdp = tdb - 9.0 - 2.0 * diurnal;
        csv.push_str(&format!("{h},{tdb:.2},{tdp:.2},3.0\n"));
    }
    csv
}

#[test]
fn hourly_csv_feeds_outdoor_setpoints() {
    let samples = read_hourly_csv(synthetic_csv().as_bytes()).unwrap();
    assert_eq!(samples.len(), 8760);

    let c = compute_from_samples(&samples, 22.0).unwrap();
    assert!(c.cooling_db_996 >= c.cooling_db_990);
    assert!(c.heating_db_004 <= c.heating_db_010);
    assert!(c.cooling_db_996 > 30.0 && c.cooling_db_996 <= 36.0);

    let sp = Setpoints::default().with_overrides(&c.to_setpoint_map()).unwrap();
    assert_eq!(sp.oat_n20_tdb, c.cooling_db_996);
    assert_eq!(sp.oat_min_04h_tdb, c.heating_db_010);
    let result = run_design(&sp, &DesignSettings::default()).unwrap();
    assert_eq!(result.approximated_states().count(), 0);
}

#[test]
fn short_csv_is_insufficient() {
    let data = "tdb,tdp\n20.0,10.0\n21.0,11.0\n";
    let samples = read_hourly_csv(data.as_bytes()).unwrap();
    assert_eq!(
        compute_from_samples(&samples, 0.0),
        Err(PercentileError::InsufficientData {
            found: 2,
            required: 1000
        })
    );
}
