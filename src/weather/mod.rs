//! 외기 설계 조건 출처. 정적 ASHRAE 표와 시간별 자료 백분위 분석 두 가지이며,
//! 둘 다 수동 입력과 같은 설정값 필드 이름의 맵을 돌려준다.

pub mod design_conditions;
pub mod hourly_csv;
pub mod percentile;

pub use design_conditions::{get_design_conditions, location_keys, DesignConditions};
pub use hourly_csv::{read_hourly_csv, HourlyCsvError};
pub use percentile::{compute_from_samples, compute_percentile_conditions, HourlySample, PercentileConditions, PercentileError};
