use super::distance::distance_km;
use super::error::{validate_radius, ProximityError, Result};
use crate::sdk::entities::{Category, Coord, Entity, LocatedEntity};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Dogs,
    Emergencies,
    Stray,
    Owned,
}

impl CategoryFilter {
    /// Whether an entity survives this filter, judged only on its category and dog type.
    pub fn admits(&self, entity: &Entity) -> bool {
        match (self, entity) {
            (CategoryFilter::All, _) => true,
            (CategoryFilter::Dogs, Entity::Dog(_)) => true,
            (CategoryFilter::Emergencies, Entity::Emergency(_)) => true,
            (CategoryFilter::Stray, Entity::Dog(dog)) => dog.is_stray(),
            // Anything that is not literally "stray" counts as owned, rescues included.
            (CategoryFilter::Owned, Entity::Dog(dog)) => !dog.is_stray(),
            _ => false,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ProximityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(CategoryFilter::All),
            "dogs" => Ok(CategoryFilter::Dogs),
            "emergencies" => Ok(CategoryFilter::Emergencies),
            "stray" => Ok(CategoryFilter::Stray),
            "owned" => Ok(CategoryFilter::Owned),
            _ => Err(ProximityError::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CategoryFilter::All => "all",
            CategoryFilter::Dogs => "dogs",
            CategoryFilter::Emergencies => "emergencies",
            CategoryFilter::Stray => "stray",
            CategoryFilter::Owned => "owned",
        };
        f.write_str(name)
    }
}

/// User-controlled filter inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search_text: String,
    #[serde(default)]
    pub category: CategoryFilter,
    /// Inclusive upper bound on distance from the reference point.
    pub radius_km: f64,
}

impl FilterCriteria {
    /// Builds criteria, rejecting a negative or non-finite radius.
    pub fn new(search_text: impl Into<String>, category: CategoryFilter, radius_km: f64) -> Result<Self> {
        Ok(Self {
            search_text: search_text.into(),
            category,
            radius_km: validate_radius(radius_km)?,
        })
    }

    pub fn with_search(mut self, search_text: impl Into<String>) -> Self {
        self.search_text = search_text.into();
        self
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_radius(self.radius_km).map(|_| ())
    }
}

/// An entity that passed sanitation, with its coordinate and (when a
/// reference point was known) its distance from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Located {
    pub entity: Entity,
    pub position: Coord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Located {
    pub fn id(&self) -> &str {
        self.entity.id()
    }

    pub fn category(&self) -> Category {
        self.entity.category()
    }
}

/// Matches if any present field contains the already case-folded query.
fn matches_search(entity: &Entity, folded_query: &str) -> bool {
    entity
        .search_fields()
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(folded_query))
}

/// Drops entities with a missing, malformed, out-of-range or `(0, 0)`
/// coordinate, and emergencies that are already resolved.
pub fn sanitize(entities: &[Entity]) -> Vec<Located> {
    let sanitized: Vec<Located> = entities
        .iter()
        .filter(|entity| entity.as_emergency().map_or(true, |e| e.is_open()))
        .filter_map(|entity| {
            entity.position().map(|position| Located {
                entity: entity.clone(),
                position,
                distance_km: None,
            })
        })
        .collect();

    let dropped = entities.len() - sanitized.len();
    if dropped > 0 {
        log::debug!("Sanitation dropped {} of {} entities", dropped, entities.len());
    }
    sanitized
}

/// Applies sanitation, category, search text and radius filters, in that order.
///
/// Without a reference point the radius step is skipped and nothing gets a
/// distance. Input order is preserved.
pub fn filter_entities(
    entities: &[Entity],
    criteria: &FilterCriteria,
    reference: Option<Coord>,
) -> Vec<Located> {
    let mut candidates = sanitize(entities);

    candidates.retain(|c| criteria.category.admits(&c.entity));
    log::debug!(
        "{} candidates after category filter '{}'",
        candidates.len(),
        criteria.category
    );

    let query = criteria.search_text.trim().to_lowercase();
    if !query.is_empty() {
        candidates.retain(|c| matches_search(&c.entity, &query));
        log::debug!("{} candidates match search {:?}", candidates.len(), query);
    }

    match reference {
        Some(origin) => {
            for candidate in candidates.iter_mut() {
                candidate.distance_km = Some(distance_km(origin, candidate.position));
            }
            candidates.retain(|c| c.distance_km.map_or(false, |d| d <= criteria.radius_km));
            log::debug!(
                "{} candidates within {} km of ({}, {})",
                candidates.len(),
                criteria.radius_km,
                origin.latitude,
                origin.longitude
            );
        }
        None => log::debug!("No reference point; skipping radius filter"),
    }

    candidates
}
