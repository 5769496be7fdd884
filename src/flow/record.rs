use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{FlowError, FlowResult};

const REQUIRED_COLUMNS: [&str; 4] = ["Year", "DepartureCode", "ArrivalCode", "NetMigration"];

/// Net migration between two regions in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub origin: String,
    pub destination: String,
    pub year: String,
    /// NaN when the source cell was not numeric; never passes the threshold.
    pub volume: f64,
}

impl FlowRecord {
    pub fn new(origin: &str, destination: &str, year: &str, volume: f64) -> Self {
        Self {
            origin: origin.trim().to_string(),
            destination: destination.trim().to_string(),
            year: year.trim().to_string(),
            volume,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MigrationRow {
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "DepartureCode")]
    departure_code: String,
    #[serde(rename = "ArrivalCode")]
    arrival_code: String,
    #[serde(rename = "NetMigration")]
    net_migration: String,
}

/// Numeric coercion for table cells: blank is zero, garbage is NaN.
/// Infinities and literals that overflow `f64` count as garbage.
pub fn coerce_volume(cell: &str) -> f64 {
    let cell = cell.trim();
    if cell.is_empty() {
        0.0
    } else {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(f64::NAN)
    }
}

pub fn read_migration_csv<R: Read>(reader: R) -> FlowResult<Vec<FlowRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(FlowError::MissingField(column));
        }
    }

    let mut records = Vec::new();
    for row in rdr.deserialize::<MigrationRow>() {
        let row = row?;
        records.push(FlowRecord::new(
            &row.departure_code,
            &row.arrival_code,
            &row.year,
            coerce_volume(&row.net_migration),
        ));
    }
    Ok(records)
}

pub fn load_migration_csv<P: AsRef<Path>>(path: P) -> FlowResult<Vec<FlowRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FlowError::io(path, e))?;
    read_migration_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_and_trims_codes() {
        let table = "Year,DepartureCode,ArrivalCode,NetMigration,Note\n\
                     2020, 11 ,26 ,500,x\n\
                     2021,26,11,abc,\n\
                     2021,26,11,,\n";
        let records = read_migration_csv(table.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], FlowRecord::new("11", "26", "2020", 500.0));
        assert_eq!(records[0].origin, "11");
        assert!(records[1].volume.is_nan());
        assert_eq!(records[2].volume, 0.0);
    }

    #[test]
    fn missing_column_is_reported() {
        let table = "Year,DepartureCode,NetMigration\n2020,11,500\n";
        let result = read_migration_csv(table.as_bytes());
        assert!(matches!(result, Err(FlowError::MissingField("ArrivalCode"))));
    }

    #[test]
    fn coercion_matches_numeric_cells() {
        assert_eq!(coerce_volume(" 120.5 "), 120.5);
        assert_eq!(coerce_volume(""), 0.0);
        assert!(coerce_volume("n/a").is_nan());
    }

    #[test]
    fn non_finite_cells_are_garbage() {
        for cell in ["inf", "-inf", "infinity", "Infinity", "NaN", "1e999", "-1e999"] {
            assert!(coerce_volume(cell).is_nan(), "{cell}");
        }
        assert_eq!(coerce_volume("1e300"), 1e300);
    }
}
