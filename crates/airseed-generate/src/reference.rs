//! Offline reader for OpenFlights-format reference files.
//!
//! `airports.dat` rows are `id,name,city,country,IATA,ICAO,...` and
//! `airlines.dat` rows are `id,name,alias,IATA,ICAO,callsign,country,active`.
//! Missing values are written as `\N`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::GenerationError;

const NULL_FIELD: &str = "\\N";

/// Real-world airport names feeding the entity factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceAirport {
    pub code: String,
    pub city: String,
    pub country: String,
}

/// Real-world airline names feeding the entity factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceAirline {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub airports: Vec<ReferenceAirport>,
    pub airlines: Vec<ReferenceAirline>,
}

impl ReferenceData {
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty() && self.airlines.is_empty()
    }

    /// Load whichever reference files are given.
    pub fn from_paths(
        airports: Option<&Path>,
        airlines: Option<&Path>,
    ) -> Result<Self, GenerationError> {
        let mut data = Self::default();
        if let Some(path) = airports {
            data.airports = read_airports(File::open(path)?)?;
        }
        if let Some(path) = airlines {
            data.airlines = read_airlines(File::open(path)?)?;
        }
        Ok(data)
    }
}

/// Parse airports with a three-letter IATA code.
pub fn read_airports<R: Read>(reader: R) -> Result<Vec<ReferenceAirport>, GenerationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut airports = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() < 5 {
            return Err(GenerationError::Reference(format!(
                "airport row {} has {} fields",
                line + 1,
                record.len()
            )));
        }
        let code = field(&record, 4);
        if code.len() != 3 || !code.bytes().all(|byte| byte.is_ascii_alphanumeric()) {
            continue;
        }
        let city = field(&record, 2);
        if city.is_empty() {
            continue;
        }
        airports.push(ReferenceAirport {
            code: code.to_ascii_uppercase(),
            city: city.to_string(),
            country: field(&record, 3).to_string(),
        });
    }
    Ok(airports)
}

/// Parse active airlines with a two-character IATA code.
pub fn read_airlines<R: Read>(reader: R) -> Result<Vec<ReferenceAirline>, GenerationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut airlines = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() < 8 {
            return Err(GenerationError::Reference(format!(
                "airline row {} has {} fields",
                line + 1,
                record.len()
            )));
        }
        let code = field(&record, 3);
        let active = field(&record, 7) == "Y";
        if !active || code.len() != 2 || !code.bytes().all(|byte| byte.is_ascii_alphanumeric()) {
            continue;
        }
        airlines.push(ReferenceAirline {
            code: code.to_ascii_uppercase(),
            name: field(&record, 1).to_string(),
        });
    }
    Ok(airlines)
}

fn field(record: &csv::StringRecord, index: usize) -> &str {
    match record.get(index).map(str::trim) {
        Some(NULL_FIELD) | None => "",
        Some(value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_airports_without_iata_code() {
        let data = "1,\"Hellinikon\",\"Athens\",\"Greece\",\\N,\"LGAT\",37.9,23.7\n\
                    2,\"Eleftherios Venizelos\",\"Athens\",\"Greece\",\"ATH\",\"LGAV\",37.9,23.9\n";
        let airports = read_airports(data.as_bytes()).expect("parse airports");
        assert_eq!(
            airports,
            vec![ReferenceAirport {
                code: "ATH".to_string(),
                city: "Athens".to_string(),
                country: "Greece".to_string(),
            }]
        );
    }

    #[test]
    fn keeps_active_airlines_only() {
        let data = "1,\"Aegean Airlines\",\\N,\"A3\",\"AEE\",\"AEGEAN\",\"Greece\",\"Y\"\n\
                    2,\"Defunct Air\",\\N,\"DX\",\"DFX\",\\N,\"Nowhere\",\"N\"\n\
                    3,\"No Code\",\\N,\\N,\"NCX\",\\N,\"Nowhere\",\"Y\"\n";
        let airlines = read_airlines(data.as_bytes()).expect("parse airlines");
        assert_eq!(airlines.len(), 1);
        assert_eq!(airlines[0].code, "A3");
        assert_eq!(airlines[0].name, "Aegean Airlines");
    }

    #[test]
    fn short_rows_are_reported() {
        let result = read_airlines("1,\"Broken\"\n".as_bytes());
        assert!(matches!(result, Err(GenerationError::Reference(_))));
    }
}
