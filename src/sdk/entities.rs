// Located records consumed by the proximity engine: reported dogs and open emergencies.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coord {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `(0, 0)` is the upstream marker for "no location set".
    pub fn is_unset_sentinel(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Finite, inside the lat/lon ranges, and not the `(0, 0)` sentinel.
    pub fn is_usable(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
            && !self.is_unset_sentinel()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dog,
    Emergency,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Dog => write!(f, "dog"),
            Category::Emergency => write!(f, "emergency"),
        }
    }
}

/// Anything the engine can place on a map.
pub trait LocatedEntity {
    fn id(&self) -> &str;

    /// Raw latitude/longitude as supplied; either may be missing.
    fn raw_position(&self) -> (Option<f64>, Option<f64>);

    fn category(&self) -> Category;

    /// Text fields consulted by the search filter. Missing fields are `None`.
    fn search_fields(&self) -> Vec<Option<&str>>;

    /// The coordinate, if present and usable.
    fn position(&self) -> Option<Coord> {
        match self.raw_position() {
            (Some(lat), Some(lon)) => Some(Coord::new(lat, lon)).filter(Coord::is_usable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DogType {
    Owned,
    Stray,
    Rescue,
}

impl DogType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owned" => Some(DogType::Owned),
            "stray" => Some(DogType::Stray),
            "rescue" => Some(DogType::Rescue),
            _ => None,
        }
    }
}

/// Emergency severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmergencyStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DogEntity {
    pub id: String,
    #[serde(default, with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub dog_type: Option<String>,
    #[serde(default, with = "lenient_number")]
    pub rating_average: Option<f64>,
    #[serde(default, with = "lenient_number")]
    pub age_years: Option<f64>,
    #[serde(default)]
    pub vaccination_status: Option<String>,
}

impl DogEntity {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> Option<DogType> {
        self.dog_type.as_deref().and_then(DogType::parse)
    }

    /// Only the literal `"stray"` tag counts as stray.
    pub fn is_stray(&self) -> bool {
        self.dog_type.as_deref() == Some("stray")
    }
}

impl LocatedEntity for DogEntity {
    fn id(&self) -> &str {
        &self.id
    }

    fn raw_position(&self) -> (Option<f64>, Option<f64>) {
        (self.latitude, self.longitude)
    }

    fn category(&self) -> Category {
        Category::Dog
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            self.name.as_deref(),
            self.breed.as_deref(),
            self.owner_name.as_deref(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmergencyEntity {
    pub id: String,
    #[serde(default, with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub emergency_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "lenient_number")]
    pub volunteers_needed: Option<u32>,
    #[serde(default, with = "lenient_number")]
    pub volunteers_responded: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl EmergencyEntity {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Default::default()
        }
    }

    pub fn severity_level(&self) -> Option<Severity> {
        self.severity.as_deref().and_then(Severity::parse)
    }

    /// A missing or unrecognised status counts as open. Case is ignored.
    pub fn status(&self) -> EmergencyStatus {
        match self.status.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("resolved") => EmergencyStatus::Resolved,
            _ => EmergencyStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() == EmergencyStatus::Open
    }

    pub fn volunteers_missing(&self) -> u32 {
        self.volunteers_needed
            .unwrap_or(0)
            .saturating_sub(self.volunteers_responded.unwrap_or(0))
    }

    /// Parses the stored RFC 3339 timestamp; `None` when absent or malformed.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| log::debug!("Ignoring malformed created_at {:?} on {}: {}", raw, self.id, e))
            .ok()
    }

    /// Most urgent first, then newest first.
    pub fn urgency_cmp(&self, other: &Self) -> Ordering {
        other
            .severity_level()
            .cmp(&self.severity_level())
            .then_with(|| other.created_at().cmp(&self.created_at()))
    }
}

impl LocatedEntity for EmergencyEntity {
    fn id(&self) -> &str {
        &self.id
    }

    fn raw_position(&self) -> (Option<f64>, Option<f64>) {
        (self.latitude, self.longitude)
    }

    fn category(&self) -> Category {
        Category::Emergency
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![self.emergency_type.as_deref(), self.description.as_deref()]
    }
}

/// One element of the mixed dog/emergency collection the engine works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum Entity {
    Dog(DogEntity),
    Emergency(EmergencyEntity),
}

impl Entity {
    pub fn as_dog(&self) -> Option<&DogEntity> {
        match self {
            Entity::Dog(dog) => Some(dog),
            Entity::Emergency(_) => None,
        }
    }

    pub fn as_emergency(&self) -> Option<&EmergencyEntity> {
        match self {
            Entity::Emergency(emergency) => Some(emergency),
            Entity::Dog(_) => None,
        }
    }

    fn inner(&self) -> &dyn LocatedEntity {
        match self {
            Entity::Dog(dog) => dog,
            Entity::Emergency(emergency) => emergency,
        }
    }
}

impl LocatedEntity for Entity {
    fn id(&self) -> &str {
        self.inner().id()
    }

    fn raw_position(&self) -> (Option<f64>, Option<f64>) {
        self.inner().raw_position()
    }

    fn category(&self) -> Category {
        self.inner().category()
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        self.inner().search_fields()
    }
}

impl From<DogEntity> for Entity {
    fn from(dog: DogEntity) -> Self {
        Entity::Dog(dog)
    }
}

impl From<EmergencyEntity> for Entity {
    fn from(emergency: EmergencyEntity) -> Self {
        Entity::Emergency(emergency)
    }
}

// --- Serde helper: numbers may arrive as numbers, numeric strings or null ---
// Anything that does not fit the target type decodes as `None` instead of failing the record.
mod lenient_number {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    pub trait Lenient: FromStr + Sized {
        fn from_f64(n: f64) -> Option<Self>;
    }

    impl Lenient for f64 {
        fn from_f64(n: f64) -> Option<Self> {
            Some(n)
        }
    }

    impl Lenient for u32 {
        fn from_f64(n: f64) -> Option<Self> {
            if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
                Some(n as u32)
            } else {
                None
            }
        }
    }

    pub fn serialize<T: Serialize, S: Serializer>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, T: Lenient, D: Deserializer<'de>>(deserializer: D) -> Result<Option<T>, D::Error> {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Raw::Number(n)) => T::from_f64(n),
            Some(Raw::Text(s)) => s.trim().parse::<T>().ok(),
            Some(Raw::Other(_)) | None => None,
        })
    }
}
