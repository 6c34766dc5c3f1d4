//! AI-enriched map locations, and the web of lines joining each cluster's points.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use riskatlas_world::{Cluster, ReferenceTables, Significance};

/// Points closer than this in both axes count as the same place.
const SAME_POINT_DEGREES: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Location,
    ConflictZone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MapLocation {
    pub id: String,
    pub name: String,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
    pub significance: Significance,
    pub cluster_id: String,
    pub severity: f64,
    #[serde(rename = "type")]
    pub kind: LocationKind,
}

/// One segment of a cluster's connection web.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterConnection {
    pub cluster_id: String,
    pub severity: f64,
    pub from: [f64; 2],
    pub to: [f64; 2],
}

/// Pull placeable points out of each cluster's map data.
///
/// Primary locations need both lat and lng on the globe. Conflict zones resolve
/// through the known-zone table, then fall back to the centroid of the cluster's
/// first country. Anything left without a coordinate is dropped.
pub fn extract_locations(clusters: &[Cluster], tables: &ReferenceTables) -> Vec<MapLocation> {
    let mut locations = Vec::new();
    let mut dropped = 0u32;

    for cluster in clusters {
        let Some(map_data) = cluster.map_data() else {
            continue;
        };

        for loc in &map_data.primary_locations {
            let Some(coordinates) = loc.coordinates.and_then(|c| c.to_lng_lat()) else {
                dropped += 1;
                continue;
            };
            locations.push(MapLocation {
                id: format!("{}-{}", cluster.id, loc.name),
                name: loc.name.clone(),
                coordinates,
                significance: loc.significance(),
                cluster_id: cluster.id.clone(),
                severity: cluster.severity,
                kind: LocationKind::Location,
            });
        }

        for zone in &map_data.conflict_zones {
            let fallback = || cluster.countries.first().and_then(|code| tables.centroid(code));
            let Some(coordinates) = tables.conflict_zone(zone).or_else(fallback) else {
                dropped += 1;
                continue;
            };
            locations.push(MapLocation {
                id: format!("{}-conflict-{}", cluster.id, zone),
                name: zone.clone(),
                coordinates,
                significance: Significance::Primary,
                cluster_id: cluster.id.clone(),
                severity: cluster.severity,
                kind: LocationKind::ConflictZone,
            });
        }
    }

    debug!(locations = locations.len(), dropped, "Extracted map locations");
    locations
}

/// Join every pair of points that belong to the same cluster.
///
/// A cluster's points are its extracted locations followed by its countries'
/// centroids, skipping a centroid that lands on a point already present. Clusters
/// with fewer than two points draw nothing.
pub fn build_cluster_connections(
    clusters: &[Cluster],
    locations: &[MapLocation],
    tables: &ReferenceTables,
) -> Vec<ClusterConnection> {
    let mut groups: Vec<(String, Vec<[f64; 2]>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for loc in locations {
        points_for(&mut groups, &mut index, &loc.cluster_id).push(loc.coordinates);
    }
    for cluster in clusters {
        let points = points_for(&mut groups, &mut index, &cluster.id);
        for coords in cluster.countries.iter().filter_map(|code| tables.centroid(code)) {
            if !points.iter().any(|p| same_point(*p, coords)) {
                points.push(coords);
            }
        }
    }

    let mut severity: HashMap<&str, f64> = HashMap::new();
    for cluster in clusters {
        severity.entry(cluster.id.as_str()).or_insert(cluster.severity);
    }

    let mut connections = Vec::new();
    for (cluster_id, points) in &groups {
        let severity = severity.get(cluster_id.as_str()).copied().unwrap_or_default();
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                connections.push(ClusterConnection {
                    cluster_id: cluster_id.clone(),
                    severity,
                    from: points[i],
                    to: points[j],
                });
            }
        }
    }

    debug!(
        clusters = groups.len(),
        connections = connections.len(),
        "Built cluster connections"
    );
    connections
}

fn points_for<'g>(
    groups: &'g mut Vec<(String, Vec<[f64; 2]>)>,
    index: &mut HashMap<String, usize>,
    cluster_id: &str,
) -> &'g mut Vec<[f64; 2]> {
    let pos = *index.entry(cluster_id.to_string()).or_insert_with(|| {
        groups.push((cluster_id.to_string(), Vec::new()));
        groups.len() - 1
    });
    &mut groups[pos].1
}

fn same_point(a: [f64; 2], b: [f64; 2]) -> bool {
    (a[0] - b[0]).abs() < SAME_POINT_DEGREES && (a[1] - b[1]).abs() < SAME_POINT_DEGREES
}
