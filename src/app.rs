use std::fs::{self, File};
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use thiserror::Error;
use tracing::{info, warn};

use crate::ahu::{self, DerivationError, OffCoilDerivation, SetpointError, Setpoints};
use crate::chart::{self, ChartData};
use crate::config::{Config, ConfigError};
use crate::psychro::{try_compute_state, AirState, PsychroError, SiteConditions};
use crate::report::{self, ReportError, ReportFormat};
use crate::ui_cli;
use crate::weather::{self, HourlyCsvError, PercentileConditions, PercentileError};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 파일 입출력 오류
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    /// 설정값 변환/검증 오류
    #[error("설정값 오류: {0}")]
    Setpoint(#[from] SetpointError),
    /// 상태 계산 오류
    #[error("상태 계산 오류: {0}")]
    Psychro(#[from] PsychroError),
    /// 코일 출구 도출 오류
    #[error("코일 출구 도출 오류: {0}")]
    Derivation(#[from] DerivationError),
    /// 보고서 작성 오류
    #[error("보고서 오류: {0}")]
    Report(#[from] ReportError),
    /// 기상 자료 오류
    #[error("기상 자료 오류: {0}")]
    HourlyCsv(#[from] HourlyCsvError),
    #[error("백분위 분석 오류: {0}")]
    Percentile(#[from] PercentileError),
    /// 표에 없는 지역
    #[error("알 수 없는 지역입니다: {0}")]
    UnknownLocation(String),
}

/// 설정값의 출처. 파일 → 지역 표 → 시간별 기상 자료 순으로 덮어쓴다.
#[derive(Args, Debug, Clone, Default)]
pub struct SetpointArgs {
    /// 설정값 TOML 파일 (키 = 숫자). 없으면 기본값
    #[arg(long, short = 's')]
    pub setpoints: Option<PathBuf>,
    /// ASHRAE 설계 조건 지역 (예: "Abu Dhabi")
    #[arg(long, short = 'l')]
    pub location: Option<String>,
    /// 시간별 기상 자료 CSV (tdb, tdp 열). 외기 설계 조건을 백분위 분석으로 채운다
    #[arg(long)]
    pub weather_csv: Option<PathBuf>,
}

/// CLI 하위 명령.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// 건구/습구온도로 한 상태점을 계산한다
    #[command(allow_negative_numbers = true)]
    State {
        tdb: f64,
        twb: f64,
        /// 해발 고도 [m]
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
    },
    /// CRAH 설정값으로부터 AHU 코일 출구 조건을 도출한다
    Derive {
        #[command(flatten)]
        source: SetpointArgs,
    },
    /// 전체 설계 계산 보고서
    Report {
        #[command(flatten)]
        source: SetpointArgs,
        /// 출력 형식. 없으면 설정 파일 값
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        /// 코일 출구 자동 도출을 끄고 입력값을 그대로 쓴다
        #[arg(long, default_value_t = false)]
        no_derive: bool,
        /// 출력 파일. 없으면 표준 출력
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// 습공기 선도 데이터를 TOML 로 내보낸다
    Chart {
        #[command(flatten)]
        source: SetpointArgs,
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// ASHRAE 설계 조건 표를 조회한다. 지역을 생략하면 목록을 보여준다
    DesignConditions { location: Option<String> },
    /// 시간별 기상 자료 CSV 로 설계 외기 조건을 산출한다
    Percentile {
        csv: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
    },
    /// 대화형 메뉴
    Interactive,
}

/// 출처 인자로부터 설정값을 만든다.
pub fn load_setpoints(source: &SetpointArgs) -> Result<Setpoints, AppError> {
    let mut setpoints = match &source.setpoints {
        Some(path) => Setpoints::from_toml_str(&fs::read_to_string(path)?)?,
        None => Setpoints::default(),
    };
    if let Some(name) = &source.location {
        let dc = weather::get_design_conditions(name)
            .ok_or_else(|| AppError::UnknownLocation(name.clone()))?;
        setpoints = setpoints.with_overrides(&dc.to_setpoint_map())?;
        info!(location = dc.location, "ASHRAE 설계 조건 적용");
    }
    if let Some(path) = &source.weather_csv {
        let altitude = setpoints.altitude;
        let conditions = percentile_from_csv(path, altitude)?;
        setpoints = setpoints.with_overrides(&conditions.to_setpoint_map())?;
        info!(samples = conditions.samples, "백분위 설계 조건 적용");
    }
    Ok(setpoints)
}

/// CSV 파일로 백분위 설계 조건을 산출한다.
pub fn percentile_from_csv(path: &Path, altitude_m: f64) -> Result<PercentileConditions, AppError> {
    let samples = weather::read_hourly_csv(File::open(path)?)?;
    Ok(weather::compute_from_samples(&samples, altitude_m)?)
}

/// 한 상태점을 엄격하게 계산한다.
pub fn state_at(tdb: f64, twb: f64, altitude_m: f64) -> Result<AirState, AppError> {
    let site = SiteConditions::from_altitude(altitude_m);
    Ok(try_compute_state(tdb, twb, site.pressure_pa)?)
}

/// 코일 출구 조건을 도출한다. 설정 파일의 여유값과 목표 엔탈피를 쓴다.
pub fn derive(config: &Config, setpoints: &Setpoints) -> Result<OffCoilDerivation, AppError> {
    setpoints.validate()?;
    let site = SiteConditions::from_altitude(setpoints.altitude);
    let inputs = config.design.off_coil_inputs(setpoints, site.pressure_pa);
    Ok(ahu::derive_off_coil(&inputs)?)
}

/// 설계 계산 후 보고서 문자열을 만든다.
pub fn report(
    config: &Config,
    setpoints: &Setpoints,
    format: ReportFormat,
    auto_derive: bool,
) -> Result<String, AppError> {
    let mut settings = config.design.clone();
    settings.auto_derive_off_coil &= auto_derive;
    let result = ahu::run_design(setpoints, &settings)?;
    Ok(report::render(&result, format, &config.display)?)
}

/// 설계 계산 후 선도 데이터를 만든다.
pub fn chart_data(config: &Config, setpoints: &Setpoints) -> Result<ChartData, AppError> {
    let result = ahu::run_design(setpoints, &config.design)?;
    Ok(chart::build_chart(&result.states, result.site.pressure_pa, &config.chart))
}

fn emit(text: &str, output: Option<&Path>) -> Result<(), AppError> {
    match output {
        Some(path) => {
            fs::write(path, text)?;
            info!(path = %path.display(), "출력 파일 저장");
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// 하위 명령 하나를 실행한다.
pub fn run(config: &mut Config, command: Command) -> Result<(), AppError> {
    match command {
        Command::State { tdb, twb, altitude } => {
            let state = state_at(tdb, twb, altitude)?;
            ui_cli::print_state(&state, &config.display);
        }
        Command::Derive { source } => {
            let setpoints = load_setpoints(&source)?;
            let derived = derive(config, &setpoints)?;
            ui_cli::print_derivation(&derived, &config.display);
        }
        Command::Report {
            source,
            format,
            no_derive,
            output,
        } => {
            let setpoints = load_setpoints(&source)?;
            let format = format.unwrap_or(config.report.format);
            let text = report(config, &setpoints, format, !no_derive)?;
            emit(&text, output.as_deref())?;
        }
        Command::Chart { source, output } => {
            let setpoints = load_setpoints(&source)?;
            let data = chart_data(config, &setpoints)?;
            let text = toml::to_string_pretty(&data).map_err(ReportError::from)?;
            emit(&text, output.as_deref())?;
        }
        Command::DesignConditions { location } => match location {
            Some(name) => {
                let dc = weather::get_design_conditions(&name)
                    .ok_or_else(|| AppError::UnknownLocation(name.clone()))?;
                ui_cli::print_design_conditions(dc);
            }
            None => {
                for key in weather::location_keys() {
                    println!("{key}");
                }
            }
        },
        Command::Percentile { csv, altitude } => {
            let conditions = percentile_from_csv(&csv, altitude)?;
            ui_cli::print_percentile_conditions(&conditions);
        }
        Command::Interactive => interactive(config)?,
    }
    Ok(())
}

/// 메뉴 안의 계산 오류는 세션을 끝내지 않고 화면에 보여준다.
fn recoverable<T>(result: Result<T, AppError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "메뉴 계산 실패");
            ui_cli::print_error(&e);
            None
        }
    }
}

/// 대화형 메뉴의 메인 루프를 실행한다.
pub fn interactive(config: &mut Config) -> Result<(), AppError> {
    let mut setpoints = Setpoints::default();
    loop {
        match ui_cli::main_menu()? {
            ui_cli::MenuChoice::State => ui_cli::handle_state(config)?,
            ui_cli::MenuChoice::Setpoints => ui_cli::handle_setpoints(&mut setpoints)?,
            ui_cli::MenuChoice::Location => ui_cli::handle_location(&mut setpoints)?,
            ui_cli::MenuChoice::Derive => {
                if let Some(derived) = recoverable(derive(config, &setpoints)) {
                    ui_cli::print_derivation(&derived, &config.display);
                }
            }
            ui_cli::MenuChoice::Report => {
                if let Some(text) = recoverable(report(config, &setpoints, ReportFormat::Text, true)) {
                    println!("{text}");
                }
            }
            ui_cli::MenuChoice::Settings => {
                ui_cli::handle_settings(config)?;
                config.save()?;
            }
            ui_cli::MenuChoice::Exit => {
                config.save()?;
                println!("프로그램을 종료합니다.");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_location_is_reported() {
        let source = SetpointArgs {
            location: Some("Atlantis".to_string()),
            ..SetpointArgs::default()
        };
        assert!(matches!(
            load_setpoints(&source),
            Err(AppError::UnknownLocation(name)) if name == "Atlantis"
        ));
    }

    #[test]
    fn location_overrides_outdoor_conditions() {
        let source = SetpointArgs {
            location: Some("johannesburg".to_string()),
            ..SetpointArgs::default()
        };
        let sp = load_setpoints(&source).unwrap();
        assert_eq!(sp.altitude, 1694.0);
        assert_eq!(sp.oat_n20_tdb, 32.2);
        assert_eq!(sp.oat_min_04h_tdb, 3.1);
        assert_eq!(sp.oat_min_04h_twb, 3.1);
        assert_eq!(sp.crah_off_tdb, Setpoints::default().crah_off_tdb);
    }

    #[test]
    fn strict_state_rejects_wet_bulb_above_dry_bulb() {
        assert!(matches!(
            state_at(20.0, 22.0, 0.0),
            Err(AppError::Psychro(PsychroError::WetBulbAboveDryBulb { .. }))
        ));
    }

    #[test]
    fn menu_derivation_error_is_shown_not_propagated() {
        let cfg = Config::default();
        let sp = Setpoints {
            crah_off_twb: 26.0,
            ..Setpoints::default()
        };
        let result = derive(&cfg, &sp);
        assert!(matches!(result, Err(AppError::Derivation(_))));
        assert!(recoverable(result).is_none());
        assert!(recoverable(derive(&cfg, &Setpoints::default())).is_some());
    }

    #[test]
    fn report_without_derivation_keeps_input_off_coil() {
        let cfg = Config::default();
        let sp = Setpoints::default();
        let text = report(&cfg, &sp, ReportFormat::Text, false).unwrap();
        assert!(!text.contains("코일 출구 자동 도출"));
        let text = report(&cfg, &sp, ReportFormat::Text, true).unwrap();
        assert!(text.contains("코일 출구 자동 도출"));
    }
}
