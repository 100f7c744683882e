use std::collections::HashMap;
use std::io::{self, Write};

use crate::ahu::{OffCoilDerivation, Setpoints};
use crate::app::{self, AppError};
use crate::config::{Config, DisplayUnits};
use crate::psychro::AirState;
use crate::units::{from_celsius, from_pascal, PressureUnit, TemperatureUnit};
use crate::weather::{self, DesignConditions, PercentileConditions};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    State,
    Setpoints,
    Location,
    Derive,
    Report,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu() -> Result<MenuChoice, AppError> {
    println!("\n=== AHU Psychrometric Toolbox ===");
    println!("1) 상태점 계산");
    println!("2) 설정값 입력");
    println!("3) ASHRAE 설계 조건 적용");
    println!("4) 코일 출구 조건 도출");
    println!("5) 설계 보고서");
    println!("6) 설정");
    println!("0) 종료");
    loop {
        let sel = read_line("메뉴 선택: ")?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::State),
            "2" => return Ok(MenuChoice::Setpoints),
            "3" => return Ok(MenuChoice::Location),
            "4" => return Ok(MenuChoice::Derive),
            "5" => return Ok(MenuChoice::Report),
            "6" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("잘못된 입력입니다. 다시 선택하세요."),
        }
    }
}

/// 상태점 계산 메뉴를 처리한다.
pub fn handle_state(cfg: &Config) -> Result<(), AppError> {
    println!("\n-- 상태점 계산 --");
    let tdb = read_f64("건구온도 [°C]: ")?;
    let twb = read_f64("습구온도 [°C]: ")?;
    let altitude = read_f64("고도 [m]: ")?;
    match app::state_at(tdb, twb, altitude) {
        Ok(state) => print_state(&state, &cfg.display),
        Err(e) => print_error(&e),
    }
    Ok(())
}

/// 설정값 입력 메뉴. `이름 = 값` 형식으로 여러 줄을 받고 빈 줄에서 끝낸다.
pub fn handle_setpoints(setpoints: &mut Setpoints) -> Result<(), AppError> {
    println!("\n-- 설정값 입력 --");
    println!("예: crah_off_tdb = 24.0  (빈 줄 입력 시 종료, `?` 입력 시 현재 값 표시)");
    let mut changes = HashMap::new();
    loop {
        let line = read_line("> ")?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if line == "?" {
            let mut entries: Vec<(String, f64)> = setpoints.to_map()?.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (k, v) in entries {
                println!("  {k:<18} {v}");
            }
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => match value.trim().parse::<f64>() {
                Ok(v) => {
                    changes.insert(key.trim().to_string(), v);
                }
                Err(_) => println!("숫자를 입력하세요."),
            },
            None => println!("`이름 = 값` 형식으로 입력하세요."),
        }
    }
    if changes.is_empty() {
        return Ok(());
    }
    match setpoints.with_overrides(&changes) {
        Ok(updated) => {
            *setpoints = updated;
            println!("{} 개 항목을 반영했습니다.", changes.len());
        }
        Err(e) => println!("반영하지 않았습니다: {e}"),
    }
    Ok(())
}

/// 지역 설계 조건 적용 메뉴를 처리한다.
pub fn handle_location(setpoints: &mut Setpoints) -> Result<(), AppError> {
    println!("\n-- ASHRAE 설계 조건 --");
    let keys = weather::location_keys();
    for (i, key) in keys.iter().enumerate() {
        println!("{:>2}) {key}", i + 1);
    }
    let sel = read_line("번호 선택(취소하려면 엔터): ")?;
    let Some(key) = sel
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| keys.get(i))
    else {
        return Ok(());
    };
    if let Some(dc) = weather::get_design_conditions(key) {
        *setpoints = setpoints.with_overrides(&dc.to_setpoint_map())?;
        print_design_conditions(dc);
    }
    Ok(())
}

/// 설정 메뉴를 처리한다.
pub fn handle_settings(cfg: &mut Config) -> Result<(), AppError> {
    println!("\n-- 설정 --");
    println!(
        "현재 표시 단위: {} / {}",
        cfg.display.temperature.symbol(),
        cfg.display.pressure.symbol()
    );
    println!("온도 단위: 1=°C 2=K 3=°F");
    let sel = read_line("변경할 번호(유지하려면 엔터): ")?;
    match sel.trim() {
        "" => {}
        "1" => cfg.display.temperature = TemperatureUnit::Celsius,
        "2" => cfg.display.temperature = TemperatureUnit::Kelvin,
        "3" => cfg.display.temperature = TemperatureUnit::Fahrenheit,
        _ => println!("잘못된 입력이므로 변경하지 않습니다."),
    }
    println!("압력 단위: 1=Pa 2=kPa 3=bar(a) 4=psia 5=mmHg");
    let sel = read_line("변경할 번호(유지하려면 엔터): ")?;
    match sel.trim() {
        "" => {}
        "1" => cfg.display.pressure = PressureUnit::Pascal,
        "2" => cfg.display.pressure = PressureUnit::KiloPascal,
        "3" => cfg.display.pressure = PressureUnit::BarA,
        "4" => cfg.display.pressure = PressureUnit::Psia,
        "5" => cfg.display.pressure = PressureUnit::MmHg,
        _ => println!("잘못된 입력이므로 변경하지 않습니다."),
    }
    let margin = read_line(&format!(
        "최대냉각 여유값 [K] (현재 {}, 유지하려면 엔터): ",
        cfg.design.cool_margin_c
    ))?;
    if let Ok(v) = margin.trim().parse::<f64>() {
        cfg.design.cool_margin_c = v;
    }
    let margin = read_line(&format!(
        "제습 여유값 [K] (현재 {}, 유지하려면 엔터): ",
        cfg.design.dehum_margin_c
    ))?;
    if let Ok(v) = margin.trim().parse::<f64>() {
        cfg.design.dehum_margin_c = v;
    }
    println!(
        "표시 단위가 {} / {} 로 설정되었습니다.",
        cfg.display.temperature.symbol(),
        cfg.display.pressure.symbol()
    );
    Ok(())
}

/// 계산 오류를 메뉴 화면에 표시한다.
pub fn print_error(err: &AppError) {
    println!("계산할 수 없습니다: {err}");
}

pub fn print_state(state: &AirState, units: &DisplayUnits) {
    let t_sym = units.temperature.symbol();
    let t = |c: f64| from_celsius(c, units.temperature);
    println!(
        "대기압: {:.3} {}",
        from_pascal(state.pressure, units.pressure),
        units.pressure.symbol()
    );
    println!("건구온도: {:.2} {t_sym}, 습구온도: {:.2} {t_sym}", t(state.tdb), t(state.twb));
    println!(
        "습도비: {:.3} g/kg, 상대습도: {:.1} %",
        state.w_g_per_kg(),
        state.rh * 100.0
    );
    println!("비엔탈피: {:.2} kJ/kg, 이슬점: {:.2} {t_sym}", state.h, t(state.tdp));
    println!("밀도: {:.4} kg/m³", state.density);
    if !state.is_valid() {
        println!("(근사값)");
    }
}

pub fn print_derivation(d: &OffCoilDerivation, units: &DisplayUnits) {
    let t_sym = units.temperature.symbol();
    let t = |c: f64| from_celsius(c, units.temperature);
    println!("CRAH 출구 이슬점: {:.2} {t_sym}", t(d.crah_off_tdp));
    println!(
        "최대냉각 코일 출구: {:.1} / {:.1} {t_sym} (여유 {:.1} K)",
        t(d.oc_cool_tdb),
        t(d.oc_cool_twb),
        d.cool_margin_c
    );
    println!(
        "제습 코일 출구:     {:.1} / {:.1} {t_sym} (여유 {:.1} K)",
        t(d.oc_dehum_tdb),
        t(d.oc_dehum_twb),
        d.dehum_margin_c
    );
    println!(
        "엔탈피 코일 출구:   {:.2} / {:.2} {t_sym} (목표 {:.1} kJ/kg{})",
        t(d.oc_enth_tdb),
        t(d.oc_enth_twb),
        d.enthalpy_target_kj_per_kg,
        if d.enthalpy_converged { "" } else { ", 대체값" }
    );
    println!(
        "가열 코일 출구:     {:.1} / {:.2} {t_sym}",
        t(d.oc_heat_tdb),
        t(d.oc_heat_twb)
    );
}

pub fn print_design_conditions(dc: &DesignConditions) {
    println!("{} ({}), 고도 {:.0} m", dc.location, dc.country, dc.altitude_m);
    println!(
        "냉방 N=20: {:.1} / {:.1} °C, 0.4%: {:.1} / {:.1} °C",
        dc.cooling_db_n20, dc.cooling_wb_n20, dc.cooling_db_04, dc.cooling_wb_04
    );
    println!("제습: {:.1} / {:.1} °C", dc.dehumid_db, dc.dehumid_wb);
    println!(
        "난방 N=20: {:.1} °C, 0.4%: {:.1} °C, 평균 습구 {:.1} °C",
        dc.heating_db_n20, dc.heating_db_004, dc.heating_db_meanwb
    );
}

pub fn print_percentile_conditions(c: &PercentileConditions) {
    println!("유효 표본 {} 시간, 고도 {:.0} m", c.samples, c.altitude_m);
    println!(
        "냉방 99.6%: {:.1} / {:.1} °C, 99.0%: {:.1} / {:.1} °C",
        c.cooling_db_996, c.cooling_wb_996, c.cooling_db_990, c.cooling_wb_990
    );
    println!("제습 99.6% 습구: {:.1} °C (동시 건구 {:.1} °C)", c.dehumid_wb_996, c.dehumid_db_996);
    println!(
        "난방 0.4%: {:.1} °C, 1.0%: {:.1} °C, 평균 습구 {:.1} °C",
        c.heating_db_004, c.heating_db_010, c.heating_wb_mean
    );
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush().map_err(AppError::Io)?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).map_err(AppError::Io)?;
    Ok(buf)
}

fn read_f64(prompt: &str) -> Result<f64, AppError> {
    loop {
        let s = read_line(prompt)?;
        match s.trim().parse::<f64>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("숫자를 입력하세요."),
        }
    }
}
