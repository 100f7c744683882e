//! 설계 계산 결과 보고서. 사람이 읽는 표 형식과 TOML 문서 두 가지를 지원한다.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ahu::{DesignIssue, DesignResult, OffCoilDerivation, PointGroup, Process, Setpoints, SystemFlows};
use crate::config::DisplayUnits;
use crate::psychro::{AirState, SiteConditions, StateQuality};
use crate::units::{from_celsius, from_pascal};

/// 보고서 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Toml,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("보고서 직렬화 오류: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("보고서 작성 오류")]
    Format(#[from] std::fmt::Error),
}

/// TOML 보고서의 상태점 행. 습도비 g/kg, 상대습도 %.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRow {
    pub name: String,
    pub group: Option<PointGroup>,
    pub tdb: f64,
    pub twb: f64,
    pub w_g_per_kg: f64,
    pub rh_percent: f64,
    pub h: f64,
    pub tdp: f64,
    pub density: f64,
    pub valid: bool,
    /// 근사 상태인 경우 그 사유
    pub note: Option<String>,
}

impl From<&AirState> for StateRow {
    fn from(s: &AirState) -> Self {
        let note = match &s.quality {
            StateQuality::Valid => None,
            StateQuality::Approximated { reason } => Some(reason.to_string()),
        };
        StateRow {
            name: s.name.clone(),
            group: PointGroup::of(&s.name),
            tdb: s.tdb,
            twb: s.twb,
            w_g_per_kg: s.w_g_per_kg(),
            rh_percent: s.rh * 100.0,
            h: s.h,
            tdp: s.tdp,
            density: s.density,
            valid: s.is_valid(),
            note,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    site: &'a SiteConditions,
    setpoints: &'a Setpoints,
    derivation: Option<&'a OffCoilDerivation>,
    flows: Option<&'a SystemFlows>,
    issues: &'a [DesignIssue],
    states: Vec<StateRow>,
    processes: &'a [Process],
}

/// 지정한 형식으로 보고서를 만든다.
pub fn render(result: &DesignResult, format: ReportFormat, units: &DisplayUnits) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => render_text(result, units),
        ReportFormat::Toml => render_toml(result),
    }
}

/// 결과 전체를 TOML 문서로 직렬화한다. 값은 반올림하지 않는다.
pub fn render_toml(result: &DesignResult) -> Result<String, ReportError> {
    let doc = ReportDocument {
        site: &result.site,
        setpoints: &result.setpoints,
        derivation: result.derivation.as_ref(),
        flows: result.flows.as_ref(),
        issues: &result.issues,
        states: result.states.values().map(StateRow::from).collect(),
        processes: &result.processes,
    };
    Ok(toml::to_string_pretty(&doc)?)
}

fn fmt_opt(v: Option<f64>, digits: usize) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{x:.digits$}"))
}

/// 표 형식 보고서. 온도와 압력은 표시 단위로 변환한다.
pub fn render_text(result: &DesignResult, units: &DisplayUnits) -> Result<String, ReportError> {
    let t_sym = units.temperature.symbol();
    let t = |c: f64| from_celsius(c, units.temperature);
    let mut out = String::new();

    writeln!(out, "=== AHU 습공기 설계 보고서 ===")?;
    writeln!(
        out,
        "고도 {:.0} m, 대기압 {:.3} {}",
        result.site.altitude_m,
        from_pascal(result.site.pressure_pa, units.pressure),
        units.pressure.symbol()
    )?;
    writeln!(out, "IT 부하 {:.1} kW", result.setpoints.it_load)?;

    if let Some(d) = &result.derivation {
        writeln!(out, "\n-- 코일 출구 자동 도출 --")?;
        writeln!(
            out,
            "CRAH 출구 이슬점 {:.2} {t_sym} (최대냉각 +{:.1}, 제습 +{:.1}, 엔탈피 목표 {:.1} kJ/kg{})",
            t(d.crah_off_tdp),
            d.cool_margin_c,
            d.dehum_margin_c,
            d.enthalpy_target_kj_per_kg,
            if d.enthalpy_converged { "" } else { ", 대체값 사용" }
        )?;
    }

    writeln!(out, "\n-- 상태점 --")?;
    writeln!(
        out,
        "{:<16} {:>8} {:>8} {:>7} {:>7} {:>8} {:>8} {:>7}",
        "이름",
        format!("Tdb {t_sym}"),
        format!("Twb {t_sym}"),
        "RH %",
        "W g/kg",
        "h kJ/kg",
        format!("Tdp {t_sym}"),
        "ρ kg/m³"
    )?;
    for s in result.states.values() {
        writeln!(
            out,
            "{:<16} {:>8.1} {:>8.1} {:>7.1} {:>7.2} {:>8.2} {:>8.1} {:>7.3}{}",
            s.name,
            t(s.tdb),
            t(s.twb),
            s.rh * 100.0,
            s.w_g_per_kg(),
            s.h,
            t(s.tdp),
            s.density,
            if s.is_valid() { "" } else { "  (근사)" }
        )?;
    }

    if let Some(f) = &result.flows {
        writeln!(out, "\n-- 시스템 풍량 --")?;
        writeln!(out, "현열 부하        {:>10.1} kW", f.q_sensible_kw)?;
        writeln!(out, "CRAH 질량유량    {:>10.2} kg/s", f.crah_mass_flow_kg_s)?;
        writeln!(out, "CRAH 체적유량    {:>10.2} m³/s", f.crah_vol_flow_m3_s)?;
        writeln!(
            out,
            "AHU 체적유량     {:>10.4} m³/s{}",
            f.ahu_vol_flow_m3_s,
            if f.ahu_vol_flow_overridden { " (지정값)" } else { " (CRAH 풍량 비율)" }
        )?;
        writeln!(out, "AHU 질량유량     {:>10.4} kg/s", f.ahu_mass_flow_kg_s)?;
        writeln!(out, "팬 동력          {:>10.3} kW", f.fan_power_kw)?;
        writeln!(out, "팬 발열 온도상승 {:>10.3} K", f.fan_delta_t_k)?;
    }

    if !result.processes.is_empty() {
        writeln!(out, "\n-- 과정별 부하 --")?;
        writeln!(
            out,
            "{:<26} {:>9} {:>9} {:>9} {:>7} {:>9}",
            "과정", "현열 kW", "잠열 kW", "전열 kW", "SHR", "수분 g/s"
        )?;
        for p in &result.processes {
            writeln!(
                out,
                "{:<26} {:>9.2} {:>9.2} {:>9.2} {:>7} {:>9.3}{}",
                p.name,
                p.q_sensible_kw,
                p.q_latent_kw,
                p.q_total_kw,
                fmt_opt(p.shr, 4),
                p.moisture_g_per_s,
                if p.valid { "" } else { "  (근사 상태 포함)" }
            )?;
        }
    }

    if !result.issues.is_empty() {
        writeln!(out, "\n-- 경고 --")?;
        for issue in &result.issues {
            writeln!(out, "[{:?}] {}", issue.stage, issue.message)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ahu::{run_design, DesignSettings};

    fn result() -> DesignResult {
        run_design(&Setpoints::default(), &DesignSettings::default()).unwrap()
    }

    #[test]
    fn text_report_lists_every_state_and_process() {
        let r = result();
        let text = render_text(&r, &DisplayUnits::default()).unwrap();
        for name in r.states.keys() {
            assert!(text.contains(name.as_str()), "{name}");
        }
        assert!(text.contains("CRAH Cooling Loop"));
        assert!(text.contains("kPa"));
    }

    #[test]
    fn toml_report_parses_back() {
        let text = render_toml(&result()).unwrap();
        let doc: toml::Table = toml::from_str(&text).unwrap();
        assert_eq!(doc["states"].as_array().map(|a| a.len()), Some(16));
        assert_eq!(doc["processes"].as_array().map(|a| a.len()), Some(6));
        assert!(doc.contains_key("flows"));
    }

    #[test]
    fn fahrenheit_display_converts_temperatures() {
        let units = DisplayUnits {
            temperature: crate::units::TemperatureUnit::Fahrenheit,
            ..DisplayUnits::default()
        };
        let text = render_text(&result(), &units).unwrap();
        assert!(text.contains("Tdb °F"));
    }
}
