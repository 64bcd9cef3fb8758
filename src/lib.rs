pub mod sdk;

pub use sdk::config::EngineConfig;
pub use sdk::entities::{Category, Coord, DogEntity, EmergencyEntity, Entity, LocatedEntity};
pub use sdk::proximity::{
    build_view_model, build_view_model_with, cluster_entities, distance_km, filter_entities, haversine_km,
    CategoryFilter, Cluster, ClusterResult, FilterCriteria, Located, ProximityError, ViewModel,
};
pub use sdk::source::{load_dogs, load_emergencies};
