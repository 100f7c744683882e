//! 습공기 선도 데이터 조립.
//!
//! 그리기는 하지 않는다. 곡선군, ASHRAE A1 범위 다각형, 과정 선분, 상태점 마커를
//! 표시 범위 안의 (건구온도, 습도비[g/kg]) 점 목록으로 만든다.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ahu::states::{self, PointGroup};
use crate::psychro::{curves, AirState, CurvePoint};

/// 선도 범위와 곡선 표본 수. 설정 파일의 `[chart]` 절이다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub tdb_min: f64,
    pub tdb_max: f64,
    pub w_max_g_per_kg: f64,
    pub saturation_samples: usize,
    pub rh_samples: usize,
    pub enthalpy_samples: usize,
    pub wb_samples: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            tdb_min: -10.0,
            tdb_max: 55.0,
            w_max_g_per_kg: 32.0,
            saturation_samples: 300,
            rh_samples: 200,
            enthalpy_samples: 100,
            wb_samples: 100,
        }
    }
}

/// 상대습도선 [분율]
pub const RH_LINES: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
/// 엔탈피선 [kJ/kg]
pub const ENTHALPY_LINES: [f64; 12] = [
    0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0,
];
/// 습구온도선 [°C]
pub const WB_LINES: [f64; 6] = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0];

/// 선도 과정 선분: (시작 상태, 끝 상태, 표시 이름)
pub const CHART_SEGMENTS: [(&str, &str, &str); 7] = [
    (states::OAT_MAX_N20, states::OC_MAX_COOL, "Summer Max Cooling"),
    (states::OAT_MAX_04E, states::OC_ENTHALPY, "Summer Enthalpy"),
    (states::OAT_MAX_04H, states::OC_DEHUM, "Summer Dehum"),
    (states::OAT_MIN_N20, states::OC_HEAT, "Winter Heating"),
    (states::OC_MAX_COOL, states::CRAH_OFF_COIL, "DOAS→CRAH"),
    (states::CRAH_ON_COIL, states::CRAH_OFF_COIL, "CRAH Process"),
    (states::RETURN_AIR, states::CRAH_ON_COIL, "Return→CRAH"),
];

/// 선도 위의 점 (건구온도 °C, 습도비 g/kg).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub tdb: f64,
    pub w_g_per_kg: f64,
}

/// 값이 붙은 곡선 (RH %, kJ/kg, °C).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledCurve {
    pub value: f64,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSegment {
    pub label: String,
    pub from: String,
    pub to: String,
    pub start: ChartPoint,
    pub end: ChartPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMarker {
    pub name: String,
    pub group: Option<PointGroup>,
    pub point: ChartPoint,
    pub valid: bool,
}

/// 선도 한 장에 필요한 모든 데이터.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub pressure_pa: f64,
    pub options: ChartOptions,
    pub saturation: Vec<ChartPoint>,
    pub rh_lines: Vec<LabeledCurve>,
    pub enthalpy_lines: Vec<LabeledCurve>,
    pub wb_lines: Vec<LabeledCurve>,
    /// 18L → 18H → 27H → 27L → 18L 순의 닫힌 다각형. 꼭짓점이 없으면 빈 목록
    pub ashrae_zone: Vec<ChartPoint>,
    pub segments: Vec<ChartSegment>,
    pub markers: Vec<StateMarker>,
}

fn visible(points: Vec<CurvePoint>, w_max: f64) -> Vec<ChartPoint> {
    points
        .into_iter()
        .filter_map(|p| {
            let w = p.w_g_per_kg?;
            (0.0..=w_max).contains(&w).then_some(ChartPoint {
                tdb: p.tdb,
                w_g_per_kg: w,
            })
        })
        .collect()
}

fn point_of(state: &AirState) -> ChartPoint {
    ChartPoint {
        tdb: state.tdb,
        w_g_per_kg: state.w_g_per_kg(),
    }
}

/// 상태 맵과 대기압으로 선도 데이터를 만든다.
pub fn build_chart(states: &IndexMap<String, AirState>, pressure_pa: f64, options: &ChartOptions) -> ChartData {
    let (t0, t1, w_max) = (options.tdb_min, options.tdb_max, options.w_max_g_per_kg);

    let saturation = visible(
        curves::saturation_curve(pressure_pa, t0, t1, options.saturation_samples),
        w_max,
    );

    let labeled = |values: &[f64], f: &dyn Fn(f64) -> Vec<CurvePoint>| -> Vec<LabeledCurve> {
        values
            .iter()
            .map(|&value| LabeledCurve {
                value,
                points: visible(f(value), w_max),
            })
            .filter(|c| !c.points.is_empty())
            .collect()
    };

    let rh_lines = labeled(&RH_LINES, &|rh| {
        curves::rh_curve(rh, pressure_pa, t0, t1, options.rh_samples)
    });
    let enthalpy_lines = labeled(&ENTHALPY_LINES, &|h| {
        curves::enthalpy_line(h, pressure_pa, t0, t1, options.enthalpy_samples)
    });
    // 습구온도선은 해당 습구온도에서 시작한다.
    let wb_lines = labeled(&WB_LINES, &|twb| {
        curves::wb_line(twb, pressure_pa, twb, t1, options.wb_samples)
    });

    let corners = [
        states::ASHRAE_18_LOW,
        states::ASHRAE_18_HIGH,
        states::ASHRAE_27_HIGH,
        states::ASHRAE_27_LOW,
        states::ASHRAE_18_LOW,
    ];
    let ashrae_zone = corners
        .iter()
        .map(|name| states.get(*name).map(point_of))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();

    let segments = CHART_SEGMENTS
        .iter()
        .filter_map(|(from, to, label)| {
            let (a, b) = (states.get(*from)?, states.get(*to)?);
            Some(ChartSegment {
                label: label.to_string(),
                from: from.to_string(),
                to: to.to_string(),
                start: point_of(a),
                end: point_of(b),
            })
        })
        .collect();

    let markers = states
        .iter()
        .map(|(name, state)| StateMarker {
            name: name.clone(),
            group: PointGroup::of(name),
            point: point_of(state),
            valid: state.is_valid(),
        })
        .collect();

    ChartData {
        pressure_pa,
        options: options.clone(),
        saturation,
        rh_lines,
        enthalpy_lines,
        wb_lines,
        ashrae_zone,
        segments,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ahu::{build_states, Setpoints};

    const P: f64 = 101_325.0;

    fn chart() -> ChartData {
        build_chart(&build_states(&Setpoints::default(), P), P, &ChartOptions::default())
    }

    #[test]
    fn curves_stay_inside_display_range() {
        let c = chart();
        let all = c
            .saturation
            .iter()
            .chain(c.rh_lines.iter().flat_map(|l| l.points.iter()))
            .chain(c.enthalpy_lines.iter().flat_map(|l| l.points.iter()))
            .chain(c.wb_lines.iter().flat_map(|l| l.points.iter()));
        for p in all {
            assert!(p.w_g_per_kg >= 0.0 && p.w_g_per_kg <= 32.0, "{p:?}");
            assert!(p.tdb >= -10.0 && p.tdb <= 55.0, "{p:?}");
        }
        // 포화곡선은 32 g/kg 을 넘는 고온부가 잘린다.
        assert!(c.saturation.len() < 300);
        assert_eq!(c.rh_lines.len(), 9);
    }

    #[test]
    fn enthalpy_lines_run_from_0_to_110() {
        let c = chart();
        let labels: Vec<f64> = c.enthalpy_lines.iter().map(|l| l.value).collect();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels.first(), Some(&0.0));
        assert_eq!(labels.last(), Some(&110.0));
        // 110 kJ/kg 선은 28 °C 이상의 고온부에서만 보인다.
        let top = c.enthalpy_lines.last().unwrap();
        assert!(top.points.iter().all(|p| p.tdb > 28.0));
    }

    #[test]
    fn ashrae_zone_is_closed() {
        let c = chart();
        assert_eq!(c.ashrae_zone.len(), 5);
        assert_eq!(c.ashrae_zone.first(), c.ashrae_zone.last());
    }

    #[test]
    fn segments_and_markers_follow_states() {
        let c = chart();
        assert_eq!(c.segments.len(), 7);
        assert_eq!(c.markers.len(), 16);
        assert!(c.markers.iter().all(|m| m.group.is_some()));
    }

    #[test]
    fn missing_states_drop_dependent_elements() {
        let mut s = build_states(&Setpoints::default(), P);
        s.shift_remove(states::ASHRAE_27_LOW);
        s.shift_remove(states::RETURN_AIR);
        let c = build_chart(&s, P, &ChartOptions::default());
        assert!(c.ashrae_zone.is_empty());
        assert_eq!(c.segments.len(), 6);
    }
}
