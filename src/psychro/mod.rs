//! 습공기(psychrometric) 물성 계산 모듈 모음.
//! 관계식, 상태점, 선도 곡선, 현장 대기압으로 구성한다.

pub mod air_state;
pub mod curves;
pub mod moist_air;
pub mod site;

pub use air_state::{compute_state, try_compute_state, AirState, StateQuality};
pub use curves::{enthalpy_line, rh_curve, saturation_curve, wb_line, CurvePoint};
pub use moist_air::PsychroError;
pub use site::SiteConditions;
