//! 시간별 기상 자료 CSV 읽기.
//!
//! 머리행에 `tdb`, `tdp` 열(°C)이 있어야 하며 다른 열은 무시한다. 빈 칸은 결측으로 보고
//! NaN 으로 읽어 백분위 분석에서 버린다.

use std::io::Read;

use csv::ReaderBuilder as CsvReaderBuilder;
use serde::Deserialize;
use thiserror::Error;

use super::percentile::HourlySample;

#[derive(Debug, Error)]
pub enum HourlyCsvError {
    #[error("기상 자료 CSV 읽기 오류: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct HourlyRecord {
    tdb: Option<f64>,
    tdp: Option<f64>,
}

/// CSV 에서 시간별 표본을 읽는다.
pub fn read_hourly_csv(source: impl Read) -> Result<Vec<HourlySample>, HourlyCsvError> {
    let mut reader = CsvReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let mut samples = Vec::new();
    for result in reader.deserialize::<HourlyRecord>() {
        let record = result?;
        samples.push(HourlySample {
            tdb: record.tdb.unwrap_or(f64::NAN),
            tdp: record.tdp.unwrap_or(f64::NAN),
        });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_columns_and_blanks() {
        let data = "time,tdb,tdp\n2024-01-01T00:00,12.5,3.1\n2024-01-01T01:00,,2.0\n";
        let samples = read_hourly_csv(data.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], HourlySample { tdb: 12.5, tdp: 3.1 });
        assert!(samples[1].tdb.is_nan());
    }

    #[test]
    fn non_numeric_value_is_an_error() {
        let data = "tdb,tdp\nwarm,3.0\n";
        assert!(read_hourly_csv(data.as_bytes()).is_err());
    }
}
