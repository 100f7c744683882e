//! 습공기 선도용 곡선 데이터 생성.
//!
//! 모든 함수는 `[tdb_min, tdb_max]` 를 `n` 개로 등분한 건구온도마다 습도비[g/kg]를 계산한다.
//! 계산이 불가능한 점은 `None` 으로 남기며 전체 곡선을 중단하지 않는다.

use serde::Serialize;

use super::moist_air;

/// 상수 엔탈피선 표시 상한 습도비 [kg/kg]
pub const ENTHALPY_LINE_MAX_W: f64 = 0.040;

/// 곡선 위의 한 점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// 건구온도 [°C]
    pub tdb: f64,
    /// 습도비 [g/kg], 계산 불가 시 `None`
    pub w_g_per_kg: Option<f64>,
}

/// numpy.linspace 와 같이 양 끝을 포함해 `n` 개로 등분한다.
pub fn linspace(min: f64, max: f64, n: usize) -> impl Iterator<Item = f64> + Clone {
    let step = if n > 1 { (max - min) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| if i + 1 == n && n > 1 { max } else { min + step * i as f64 })
}

fn sample(tdb_min: f64, tdb_max: f64, n: usize, f: impl Fn(f64) -> Option<f64>) -> Vec<CurvePoint> {
    linspace(tdb_min, tdb_max, n)
        .map(|tdb| CurvePoint {
            tdb,
            w_g_per_kg: f(tdb).map(|w| w * 1000.0),
        })
        .collect()
}

/// 포화곡선(RH 100%).
pub fn saturation_curve(pressure: f64, tdb_min: f64, tdb_max: f64, n: usize) -> Vec<CurvePoint> {
    sample(tdb_min, tdb_max, n, |t| moist_air::sat_hum_ratio(t, pressure).ok())
}

/// 상수 상대습도선. `rh` 는 0~1 분율이다.
pub fn rh_curve(rh: f64, pressure: f64, tdb_min: f64, tdb_max: f64, n: usize) -> Vec<CurvePoint> {
    sample(tdb_min, tdb_max, n, |t| {
        moist_air::hum_ratio_from_rel_hum(t, rh, pressure).ok()
    })
}

/// 상수 엔탈피선: W = (h − 1.006·T) / (2501 + 1.86·T)
///
/// 습도비가 0~0.040 kg/kg 범위를 벗어나면 `None` 이다. 대기압에는 의존하지 않지만
/// 다른 곡선과 같은 시그니처를 유지한다.
pub fn enthalpy_line(
    h_kj_per_kg: f64,
    _pressure: f64,
    tdb_min: f64,
    tdb_max: f64,
    n: usize,
) -> Vec<CurvePoint> {
    sample(tdb_min, tdb_max, n, |t| {
        let w = (h_kj_per_kg - 1.006 * t) / (2501.0 + 1.86 * t);
        (w.is_finite() && (0.0..=ENTHALPY_LINE_MAX_W).contains(&w)).then_some(w)
    })
}

/// 상수 습구온도선. 건구온도가 습구온도보다 낮은 점은 `None` 이다.
pub fn wb_line(twb: f64, pressure: f64, tdb_min: f64, tdb_max: f64, n: usize) -> Vec<CurvePoint> {
    sample(tdb_min, tdb_max, n, |t| {
        if t < twb {
            return None;
        }
        moist_air::hum_ratio_from_wet_bulb(t, twb, pressure)
            .ok()
            .filter(|w| *w >= 0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let v: Vec<f64> = linspace(-10.0, 55.0, 14).collect();
        assert_eq!(v.len(), 14);
        assert_eq!(v[0], -10.0);
        assert_eq!(v[13], 55.0);
        assert!((v[1] - -5.0).abs() < 1e-12);
    }

    #[test]
    fn linspace_degenerate_counts() {
        assert_eq!(linspace(0.0, 1.0, 0).count(), 0);
        assert_eq!(linspace(3.0, 9.0, 1).collect::<Vec<_>>(), vec![3.0]);
    }

    #[test]
    fn enthalpy_line_is_clipped_to_display_range() {
        let line = enthalpy_line(50.0, 101_325.0, -10.0, 55.0, 66);
        // 50 °C 에서 W 는 음수가 된다.
        assert!(line.last().unwrap().w_g_per_kg.is_none());
        // 25 °C 에서 W = (50 - 25.15) / 2547.5 ≈ 9.75 g/kg
        let at_25 = line.iter().find(|p| (p.tdb - 25.0).abs() < 1e-9).unwrap();
        assert!((at_25.w_g_per_kg.unwrap() - 9.755).abs() < 0.01);
    }

    #[test]
    fn wet_bulb_line_is_undefined_below_wet_bulb() {
        let line = wb_line(20.0, 101_325.0, 10.0, 40.0, 31);
        for p in &line {
            if p.tdb < 20.0 {
                assert!(p.w_g_per_kg.is_none());
            } else {
                assert!(p.w_g_per_kg.is_some());
            }
        }
    }

    #[test]
    fn invalid_samples_do_not_abort_the_curve() {
        // 250 °C 는 Hyland-Wexler 범위를 벗어난다.
        let curve = saturation_curve(101_325.0, 190.0, 250.0, 7);
        assert_eq!(curve.len(), 7);
        assert!(curve.last().unwrap().w_g_per_kg.is_none());
    }
}
