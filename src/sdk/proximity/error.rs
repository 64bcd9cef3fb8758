use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProximityError {
    /// The category filter did not name one of the known filters.
    #[error("Unknown category filter: \"{0}\" (expected all, dogs, emergencies, stray or owned)")]
    UnknownCategory(String),

    #[error("Radius must be a finite, non-negative number of kilometres (got {0})")]
    InvalidRadius(f64),

    // A variable that is set but cannot be parsed
    #[error("Invalid value for {var}: {message}")]
    Config { var: String, message: String },
}

pub type Result<T> = std::result::Result<T, ProximityError>;

/// Rejects negative, NaN and infinite radii.
pub fn validate_radius(radius_km: f64) -> Result<f64> {
    if radius_km.is_finite() && radius_km >= 0.0 {
        Ok(radius_km)
    } else {
        Err(ProximityError::InvalidRadius(radius_km))
    }
}
