//! 1차원 구간 근 찾기.
//!
//! 브래킷 `[lower, upper]` 양 끝에서 함수값의 부호가 달라야 하며, 결과는 허용오차 `xtol`
//! 안에서 근을 포함하는 구간의 한 점이다. 실패는 모두 [`SolveError`] 로 돌려준다.

use roots::{find_root_brent, SimpleConvergency};
use thiserror::Error;

/// 근 찾기 실패 사유.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// 브래킷 양 끝의 부호가 같음
    #[error("구간 [{lower}, {upper}] 에서 함수 부호가 바뀌지 않습니다")]
    NoSignChange { lower: f64, upper: f64 },
    /// 함수값이 NaN/무한대
    #[error("x = {0} 에서 함수값이 유한하지 않습니다")]
    NonFinite(f64),
    /// 최대 반복 횟수 초과
    #[error("{0}회 반복 안에 수렴하지 않았습니다")]
    IterationLimit(usize),
    /// Brent 구현에서 보고한 오류
    #[error("Brent 탐색 실패: {0}")]
    Brent(String),
}

/// 교체 가능한 1차원 근 찾기 알고리즘.
pub trait RootSolver {
    /// `f(x) = 0` 인 `x` 를 `[lower, upper]` 안에서 찾는다.
    fn solve(&self, f: &dyn Fn(f64) -> f64, lower: f64, upper: f64) -> Result<f64, SolveError>;
}

fn bracket_values(
    f: &dyn Fn(f64) -> f64,
    lower: f64,
    upper: f64,
) -> Result<(f64, f64), SolveError> {
    let f_lower = f(lower);
    if !f_lower.is_finite() {
        return Err(SolveError::NonFinite(lower));
    }
    let f_upper = f(upper);
    if !f_upper.is_finite() {
        return Err(SolveError::NonFinite(upper));
    }
    if f_lower * f_upper > 0.0 {
        return Err(SolveError::NoSignChange { lower, upper });
    }
    Ok((f_lower, f_upper))
}

/// 이분법.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bisection {
    pub xtol: f64,
    pub max_iter: usize,
}

impl Default for Bisection {
    fn default() -> Self {
        Self {
            xtol: 0.01,
            max_iter: 100,
        }
    }
}

impl RootSolver for Bisection {
    fn solve(&self, f: &dyn Fn(f64) -> f64, lower: f64, upper: f64) -> Result<f64, SolveError> {
        let (mut f_lo, _) = bracket_values(f, lower, upper)?;
        let (mut lo, mut hi) = (lower, upper);
        if f_lo == 0.0 {
            return Ok(lo);
        }
        for _ in 0..self.max_iter {
            let mid = 0.5 * (lo + hi);
            if (hi - lo).abs() <= self.xtol {
                return Ok(mid);
            }
            let f_mid = f(mid);
            if !f_mid.is_finite() {
                return Err(SolveError::NonFinite(mid));
            }
            if f_mid == 0.0 {
                return Ok(mid);
            }
            if f_lo * f_mid < 0.0 {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
            }
        }
        Err(SolveError::IterationLimit(self.max_iter))
    }
}

/// Brent 법. scipy.optimize.brentq 와 같은 기본값(최대 100회)을 쓴다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brent {
    pub xtol: f64,
    pub max_iter: usize,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            xtol: 0.01,
            max_iter: 100,
        }
    }
}

impl RootSolver for Brent {
    fn solve(&self, f: &dyn Fn(f64) -> f64, lower: f64, upper: f64) -> Result<f64, SolveError> {
        bracket_values(f, lower, upper)?;
        let mut convergency = SimpleConvergency {
            eps: self.xtol,
            max_iter: self.max_iter,
        };
        let root = find_root_brent(lower, upper, |x: f64| f(x), &mut convergency)
            .map_err(|e| SolveError::Brent(e.to_string()))?;
        if root.is_finite() {
            Ok(root)
        } else {
            Err(SolveError::NonFinite(root))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cubic(x: f64) -> f64 {
        x * x * x - 2.0 * x - 5.0
    }

    #[rstest]
    #[case::bisection(&Bisection { xtol: 1e-6, max_iter: 200 })]
    #[case::brent(&Brent { xtol: 1e-6, max_iter: 100 })]
    fn finds_root_of_cubic(#[case] solver: &dyn RootSolver) {
        let root = solver.solve(&cubic, 2.0, 3.0).unwrap();
        assert!((root - 2.094_551_48).abs() < 1e-4, "root={root}");
    }

    #[rstest]
    #[case::bisection(&Bisection::default())]
    #[case::brent(&Brent::default())]
    fn reports_missing_sign_change(#[case] solver: &dyn RootSolver) {
        assert_eq!(
            solver.solve(&|x| x * x + 1.0, -1.0, 1.0),
            Err(SolveError::NoSignChange {
                lower: -1.0,
                upper: 1.0
            })
        );
    }

    #[test]
    fn reports_non_finite_bracket() {
        let solver = Bisection::default();
        assert_eq!(
            solver.solve(&|_| f64::NAN, 0.0, 1.0),
            Err(SolveError::NonFinite(0.0))
        );
    }

    #[test]
    fn bisection_hits_iteration_limit() {
        let solver = Bisection {
            xtol: 1e-12,
            max_iter: 3,
        };
        assert_eq!(
            solver.solve(&cubic, 2.0, 3.0),
            Err(SolveError::IterationLimit(3))
        );
    }
}
