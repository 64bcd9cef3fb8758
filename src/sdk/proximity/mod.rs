pub mod cluster;
pub mod distance;
pub mod error;
pub mod filter;
pub mod view;

pub use cluster::{cluster_entities, cluster_entities_within, Cluster, ClusterResult, DEFAULT_CLUSTER_RADIUS_KM};
pub use distance::{distance_km, haversine_km, EARTH_RADIUS_KM};
pub use error::{ProximityError, Result};
pub use filter::{filter_entities, sanitize, CategoryFilter, FilterCriteria, Located};
pub use view::{build_view_model, build_view_model_with, ViewModel};
