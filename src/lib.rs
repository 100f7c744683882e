//! 핵심 계산 로직을 라이브러리로 분리하여 CLI 뿐 아니라 다른 화면에서도 쓰기 쉽게 한다.

pub mod ahu;
pub mod app;
pub mod chart;
pub mod config;
pub mod psychro;
pub mod report;
pub mod solver;
pub mod ui_cli;
pub mod units;
pub mod weather;
