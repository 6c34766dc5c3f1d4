//! Geopolitical risk surface engine.
//!
//! Turns a snapshot of event clusters, articles and market quotes into per-country
//! risk records, a conflict/alliance graph, and a ranked hotspot list. Every stage is
//! a pure function of its inputs plus an explicit `as_of` clock.

pub mod aggregate;
pub mod color;
pub mod config;
pub mod error;
pub mod graph;
pub mod hotspot;
pub mod locations;
pub mod record;
pub mod snapshot;
pub mod surface;

pub use aggregate::{recency_factor, RiskAggregator};
pub use color::{
    bloc_color, color_for, country_shade, edge_color, hotspot_color, stability_band, CountryShade,
    DisplayBand, Rgba, StabilityBand, VolatilityLevel,
};
pub use config::{CombinedRisk, EngineConfig};
pub use error::EngineError;
pub use graph::{build_alliance_edges, build_conflict_edges, AllianceLine, Edge, EdgeKind};
pub use hotspot::{classify, Hotspot, RiskType};
pub use locations::{
    build_cluster_connections, extract_locations, ClusterConnection, LocationKind, MapLocation,
};
pub use record::{CountryRiskRecord, RiskRecords};
pub use snapshot::Snapshot;
pub use surface::{RiskSurface, SurfaceOptions};

pub use riskatlas_world as world;
