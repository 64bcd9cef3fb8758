use super::cluster::{cluster_entities_within, Cluster};
use super::error::Result;
use super::filter::{filter_entities, FilterCriteria, Located};
use crate::sdk::config::EngineConfig;
use crate::sdk::entities::{Category, Coord, DogEntity, EmergencyEntity, Entity};
use serde::Serialize;
use std::cmp::Ordering;

/// What the map layer renders: clusters plus the ungrouped dogs and emergencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewModel {
    pub clusters: Vec<Cluster>,
    pub singleton_dogs: Vec<Located>,
    pub singleton_emergencies: Vec<Located>,
}

impl ViewModel {
    pub fn total_entities(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum::<usize>()
            + self.singleton_dogs.len()
            + self.singleton_emergencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_entities() == 0
    }

    /// Orders singletons and cluster members nearest first; entities without a
    /// distance go last. Clusters are ordered by their nearest member.
    pub fn sort_by_distance(&mut self) {
        self.singleton_dogs.sort_by(by_distance);
        self.singleton_emergencies.sort_by(by_distance);
        for cluster in self.clusters.iter_mut() {
            cluster.members.sort_by(by_distance);
        }
        self.clusters
            .sort_by(|a, b| cmp_distance(a.members.first(), b.members.first()));
    }
}

fn by_distance(a: &Located, b: &Located) -> Ordering {
    cmp_distance(Some(a), Some(b))
}

fn cmp_distance(a: Option<&Located>, b: Option<&Located>) -> Ordering {
    let key = |l: Option<&Located>| l.and_then(|l| l.distance_km);
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filters, clusters and partitions with the default engine settings.
///
/// Recomputed from scratch on every call; nothing is cached between calls.
pub fn build_view_model(
    dogs: &[DogEntity],
    emergencies: &[EmergencyEntity],
    criteria: &FilterCriteria,
    reference: Option<Coord>,
) -> Result<ViewModel> {
    build_view_model_with(&EngineConfig::default(), dogs, emergencies, criteria, reference)
}

pub fn build_view_model_with(
    config: &EngineConfig,
    dogs: &[DogEntity],
    emergencies: &[EmergencyEntity],
    criteria: &FilterCriteria,
    reference: Option<Coord>,
) -> Result<ViewModel> {
    criteria.validate()?;

    let entities: Vec<Entity> = dogs
        .iter()
        .cloned()
        .map(Entity::from)
        .chain(emergencies.iter().cloned().map(Entity::from))
        .collect();

    let filtered = filter_entities(&entities, criteria, reference);
    let result = cluster_entities_within(filtered, config.cluster_radius_km, config.min_cluster_input);

    let (singleton_dogs, singleton_emergencies): (Vec<Located>, Vec<Located>) = result
        .singletons
        .into_iter()
        .partition(|l| l.category() == Category::Dog);

    Ok(ViewModel {
        clusters: result.clusters,
        singleton_dogs,
        singleton_emergencies,
    })
}
