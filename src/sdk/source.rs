// Loads dog and emergency collections from JSON or CSV exports.
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::{fs::File, io::Read, path::Path};

use super::entities::{DogEntity, EmergencyEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Picks the format from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(SourceFormat::Json),
            Some("csv") => Ok(SourceFormat::Csv),
            _ => bail!("Unsupported file type for {} (expected .json or .csv)", path.display()),
        }
    }
}

/// Reads records from a JSON array. Records that do not decode are skipped.
pub fn read_json<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_reader(reader).context("Expected a JSON array of records")?;
    let total = raw.len();
    let records: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping JSON record #{}: {}", i, e);
                None
            }
        })
        .collect();
    log::debug!("Decoded {} of {} JSON records", records.len(), total);
    Ok(records)
}

/// Reads records from a headed CSV. Rows that do not decode are skipped.
pub fn read_csv<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping CSV row #{}: {}", i + 1, e),
        }
    }
    Ok(records)
}

fn load<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path)?;
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let records = match format {
        SourceFormat::Json => read_json(file),
        SourceFormat::Csv => read_csv(file),
    }
    .with_context(|| format!("Failed to read records from {}", path.display()))?;
    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_dogs<P: AsRef<Path>>(path: P) -> Result<Vec<DogEntity>> {
    load(path)
}

pub fn load_emergencies<P: AsRef<Path>>(path: P) -> Result<Vec<EmergencyEntity>> {
    load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::proximity::{build_view_model, CategoryFilter, FilterCriteria};
    use std::io::Write;

    #[test]
    fn format_follows_extension() {
        assert_eq!(SourceFormat::from_path("dogs.JSON").unwrap(), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path("a/b/emergencies.csv").unwrap(), SourceFormat::Csv);
        assert!(SourceFormat::from_path("dogs.xml").is_err());
        assert!(SourceFormat::from_path("dogs").is_err());
    }

    #[test]
    fn json_skips_undecodable_records() {
        let json = r#"[
            {"id": "d1", "latitude": 18.4482, "longitude": 73.8993, "dog_type": "stray"},
            {"latitude": 1.0},
            {"id": "d2", "latitude": "18.4483", "longitude": "73.8994"}
        ]"#;
        let dogs: Vec<DogEntity> = read_json(json.as_bytes()).unwrap();
        assert_eq!(dogs.len(), 2);
        assert_eq!(dogs[1].latitude, Some(18.4483));
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(read_json::<DogEntity, _>(r#"{"id": "d1"}"#.as_bytes()).is_err());
    }

    #[test]
    fn csv_reads_empty_cells_as_missing() {
        let csv = "id,latitude,longitude,emergency_type,severity,volunteers_needed\n\
                   e1,19.0,74.0,injury,high,3\n\
                   e2,,74.1,rescue,,\n";
        let emergencies: Vec<EmergencyEntity> = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(emergencies.len(), 2);
        assert_eq!(emergencies[0].volunteers_needed, Some(3));
        assert_eq!(emergencies[1].latitude, None);
        assert_eq!(emergencies[1].severity, None);
    }

    #[test]
    fn bad_optional_fields_do_not_drop_records() {
        let csv = "id,latitude,longitude,volunteers_needed,status\n\
                   e1,19.0,74.0,-1,open\n\
                   e2,19.1,74.1,2,Resolved\n";
        let emergencies: Vec<EmergencyEntity> = read_csv(csv.as_bytes()).unwrap();
        let ids: Vec<&str> = emergencies.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e2"]);
        assert_eq!(emergencies[0].volunteers_needed, None);

        let json = r#"[
            {"id": "d1", "latitude": 18.4482, "longitude": 73.8993, "rating_average": "4.5"},
            {"id": "d2", "latitude": 18.52, "longitude": 73.85, "age_years": "old"}
        ]"#;
        let dogs: Vec<DogEntity> = read_json(json.as_bytes()).unwrap();
        let ids: Vec<&str> = dogs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["d1", "d2"]);
        assert_eq!(dogs[0].rating_average, Some(4.5));
        assert_eq!(dogs[1].age_years, None);

        let criteria = FilterCriteria::new("", CategoryFilter::All, 100.0).unwrap();
        let view = build_view_model(&dogs, &emergencies, &criteria, None).unwrap();
        let dog_ids: Vec<&str> = view.singleton_dogs.iter().map(|l| l.id()).collect();
        let emergency_ids: Vec<&str> = view.singleton_emergencies.iter().map(|l| l.id()).collect();
        assert_eq!(dog_ids, ["d1", "d2"]);
        // e2 is resolved, whatever the case of its status.
        assert_eq!(emergency_ids, ["e1"]);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"id": "d1", "latitude": 18.0, "longitude": 73.0}}]"#).unwrap();
        let dogs = load_dogs(file.path()).unwrap();
        assert_eq!(dogs.len(), 1);
        assert_eq!(dogs[0].id, "d1");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_emergencies("/definitely/not/here.csv").is_err());
    }
}
