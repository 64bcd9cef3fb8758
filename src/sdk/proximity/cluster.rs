use super::distance::distance_km;
use super::filter::Located;
use crate::sdk::entities::Coord;
use serde::Serialize;

/// Default clustering radius. Independent of the user's search radius.
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 0.5;

/// Inputs smaller than this are never clustered.
pub const MIN_CLUSTER_INPUT: usize = 3;

/// Two or more entities drawn as a single marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// `"cluster-<seed id>"`. Not stable across recomputations.
    pub id: String,
    /// Unweighted mean of the members' coordinates.
    pub centroid: Coord,
    pub members: Vec<Located>,
}

impl Cluster {
    fn from_members(seed_id: &str, members: Vec<Located>) -> Self {
        let n = members.len() as f64;
        let (lat_sum, lon_sum) = members.iter().fold((0.0, 0.0), |(lat, lon), m| {
            (lat + m.position.latitude, lon + m.position.longitude)
        });
        Self {
            id: format!("cluster-{}", seed_id),
            centroid: Coord::new(lat_sum / n, lon_sum / n),
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterResult {
    pub clusters: Vec<Cluster>,
    pub singletons: Vec<Located>,
}

/// Clusters with the default 0.5 km radius.
pub fn cluster_entities(entities: Vec<Located>) -> ClusterResult {
    cluster_entities_within(entities, DEFAULT_CLUSTER_RADIUS_KM, MIN_CLUSTER_INPUT)
}

/// Greedy single pass: each unclaimed entity, in input order, claims every
/// other unclaimed entity strictly closer than `radius_km`. Output depends on
/// input order. O(n²) distance evaluations.
///
/// Inputs with fewer than `min_input` entities come back as singletons.
pub fn cluster_entities_within(entities: Vec<Located>, radius_km: f64, min_input: usize) -> ClusterResult {
    if entities.len() < min_input.max(2) {
        return ClusterResult {
            clusters: Vec::new(),
            singletons: entities,
        };
    }

    let n = entities.len();
    // Index of the cluster each entity was claimed by, if any.
    let mut owner: Vec<Option<usize>> = vec![None; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for seed in 0..n {
        if owner[seed].is_some() {
            continue;
        }
        let nearby: Vec<usize> = (0..n)
            .filter(|&other| other != seed && owner[other].is_none())
            .filter(|&other| distance_km(entities[seed].position, entities[other].position) < radius_km)
            .collect();
        if nearby.is_empty() {
            continue;
        }

        let group_idx = groups.len();
        owner[seed] = Some(group_idx);
        for &other in &nearby {
            owner[other] = Some(group_idx);
        }
        let mut group = Vec::with_capacity(nearby.len() + 1);
        group.push(seed);
        group.extend(nearby);
        groups.push(group);
    }

    let mut slots: Vec<Option<Located>> = entities.into_iter().map(Some).collect();
    let clusters: Vec<Cluster> = groups
        .into_iter()
        .map(|group| {
            let members: Vec<Located> = group.iter().filter_map(|&i| slots[i].take()).collect();
            let seed_id = members[0].id().to_string();
            Cluster::from_members(&seed_id, members)
        })
        .collect();
    let singletons: Vec<Located> = slots.into_iter().flatten().collect();

    log::debug!(
        "Formed {} clusters from {} entities ({} singletons)",
        clusters.len(),
        n,
        singletons.len()
    );

    ClusterResult {
        clusters,
        singletons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::entities::{DogEntity, Entity};

    fn located(id: &str, lat: f64, lon: f64) -> Located {
        Located {
            entity: Entity::Dog(DogEntity::new(id, lat, lon)),
            position: Coord::new(lat, lon),
            distance_km: None,
        }
    }

    // Roughly 0.1 km north of the given point.
    fn north_100m(lat: f64) -> f64 {
        lat + 0.1 / 111.19
    }

    #[test]
    fn two_entities_are_never_clustered() {
        let result = cluster_entities(vec![located("a", 18.0, 73.0), located("b", 18.0, 73.0)]);
        assert!(result.clusters.is_empty());
        assert_eq!(result.singletons.len(), 2);
    }

    #[test]
    fn close_pair_clusters_and_distant_entity_stays_single() {
        let result = cluster_entities(vec![
            located("a", 18.0, 73.0),
            located("b", north_100m(18.0), 73.0),
            located("far", 18.09, 73.0),
        ]);
        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].len(), 2);
        assert_eq!(result.clusters[0].id, "cluster-a");
        assert_eq!(result.singletons.len(), 1);
        assert_eq!(result.singletons[0].id(), "far");
    }

    #[test]
    fn distant_entities_form_no_clusters() {
        let result = cluster_entities(vec![
            located("a", 18.0, 73.0),
            located("b", 18.09, 73.0),
            located("c", 18.18, 73.0),
        ]);
        assert!(result.clusters.is_empty());
        assert_eq!(result.singletons.len(), 3);
    }

    #[test]
    fn centroid_is_the_unweighted_mean() {
        let result = cluster_entities(vec![
            located("a", 18.4480, 73.8990),
            located("b", 18.4482, 73.8994),
            located("c", 18.4487, 73.8992),
        ]);
        assert_eq!(result.clusters.len(), 1);
        let centroid = result.clusters[0].centroid;
        assert!((centroid.latitude - (18.4480 + 18.4482 + 18.4487) / 3.0).abs() < 1e-12);
        assert!((centroid.longitude - (73.8990 + 73.8994 + 73.8992) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn first_seed_claims_its_neighbours() {
        // b sits between a and c; a claims b, and c is too far from a.
        let a = located("a", 18.0, 73.0);
        let b = located("b", 18.0 + 0.4 / 111.19, 73.0);
        let c = located("c", 18.0 + 0.8 / 111.19, 73.0);

        let result = cluster_entities(vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(result.clusters.len(), 1);
        let member_ids: Vec<&str> = result.clusters[0].members.iter().map(|m| m.id()).collect();
        assert_eq!(member_ids, ["a", "b"]);
        assert_eq!(result.singletons[0].id(), "c");

        // Starting from b instead pulls in both neighbours.
        let result = cluster_entities(vec![b, a, c]);
        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].len(), 3);
        assert_eq!(result.clusters[0].id, "cluster-b");
        assert!(result.singletons.is_empty());
    }

    #[test]
    fn every_entity_appears_exactly_once() {
        let input: Vec<Located> = (0..20)
            .map(|i| located(&format!("e{}", i), 18.0 + (i % 5) as f64 * 0.002, 73.0 + (i / 5) as f64 * 0.02))
            .collect();
        let result = cluster_entities(input);
        let mut seen: Vec<String> = result
            .clusters
            .iter()
            .flat_map(|c| c.members.iter().map(|m| m.id().to_string()))
            .chain(result.singletons.iter().map(|s| s.id().to_string()))
            .collect();
        assert_eq!(seen.len(), 20);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 20, "an entity was placed twice");
        assert!(result.clusters.iter().all(|c| c.len() >= 2));
    }

    #[test]
    fn custom_radius_and_threshold() {
        let input = vec![located("a", 18.0, 73.0), located("b", 18.09, 73.0)];
        let result = cluster_entities_within(input, 15.0, 2);
        assert_eq!(result.clusters.len(), 1);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(cluster_entities(Vec::new()), ClusterResult::default());
    }
}
