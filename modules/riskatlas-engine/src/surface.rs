use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use typed_builder::TypedBuilder;

use riskatlas_world::{LayerKind, ReferenceTables};

use crate::aggregate::RiskAggregator;
use crate::color::{country_shade, CountryShade};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::graph::{build_alliance_edges, build_conflict_edges, AllianceLine, Edge};
use crate::hotspot::{classify, Hotspot};
use crate::locations::{build_cluster_connections, extract_locations, ClusterConnection, MapLocation};
use crate::record::RiskRecords;
use crate::snapshot::Snapshot;

/// Inputs to a recomputation that are not part of the data snapshot.
#[derive(Clone, TypedBuilder)]
pub struct SurfaceOptions {
    /// Clock for recency decay. Passed in so results are reproducible.
    pub as_of: DateTime<Utc>,
    #[builder(default)]
    pub show_alliances: bool,
    #[builder(default)]
    pub config: EngineConfig,
    #[builder(default = ReferenceTables::builtin())]
    pub tables: ReferenceTables,
}

impl SurfaceOptions {
    /// Options with config read from `RISKATLAS_*` variables and built-in tables.
    pub fn from_env(as_of: DateTime<Utc>, show_alliances: bool) -> Result<Self, EngineError> {
        let config = EngineConfig::from_env()?;
        config.log_summary();
        Ok(Self::builder()
            .as_of(as_of)
            .show_alliances(show_alliances)
            .config(config)
            .build())
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSurface {
    pub records: RiskRecords,
    pub conflict_lines: Vec<Edge>,
    pub alliance_lines: Vec<AllianceLine>,
    pub hotspots: Vec<Hotspot>,
    /// AI-enriched markers; empty while the `ai-locations` layer is hidden.
    pub locations: Vec<MapLocation>,
    pub cluster_connections: Vec<ClusterConnection>,
}

impl RiskSurface {
    /// Aggregate, then derive edges and hotspots from the same records.
    pub fn compute(snapshot: &Snapshot, options: &SurfaceOptions) -> Self {
        let layers = snapshot.layer_toggles();
        let config = &options.config;

        let records = RiskAggregator::new(&options.tables, config, options.as_of).aggregate(
            &snapshot.countries,
            &snapshot.clusters,
            &snapshot.articles,
            &snapshot.market_symbols,
            layers,
        );

        let conflict_lines =
            build_conflict_edges(&snapshot.clusters, config.conflict_edge_threshold);

        let alliance_lines = build_alliance_edges(
            &options.tables,
            &snapshot.countries,
            &records,
            options.show_alliances,
            config.alliance_fanout,
        );

        let hotspots = classify(&records, &snapshot.countries, &options.tables, config.combined_risk);

        // Connections are drawn whatever the marker layer says.
        let all_locations = extract_locations(&snapshot.clusters, &options.tables);
        let cluster_connections =
            build_cluster_connections(&snapshot.clusters, &all_locations, &options.tables);
        let locations = if layers.is_visible(LayerKind::AiLocations) {
            all_locations
        } else {
            Vec::new()
        };

        info!(
            records = records.len(),
            conflict_lines = conflict_lines.len(),
            alliance_lines = alliance_lines.len(),
            hotspots = hotspots.len(),
            locations = locations.len(),
            cluster_connections = cluster_connections.len(),
            "Risk surface computed"
        );

        Self {
            records,
            conflict_lines,
            alliance_lines,
            hotspots,
            locations,
            cluster_connections,
        }
    }

    /// Fill decision for one country under the snapshot's layer settings.
    pub fn shade(&self, code: &str, snapshot: &Snapshot, options: &SurfaceOptions) -> Option<CountryShade> {
        let record = self.records.get(code)?;
        Some(country_shade(
            record,
            &snapshot.layer_toggles(),
            options.config.combined_risk,
        ))
    }
}
