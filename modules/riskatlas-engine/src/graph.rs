use std::collections::{HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use riskatlas_world::{Bloc, Cluster, Country, ReferenceTables};

use crate::record::RiskRecords;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Conflict,
    Tension,
}

impl EdgeKind {
    /// Strictly above the threshold is a conflict; exactly at it is still a tension.
    pub fn classify(intensity: f64, threshold: f64) -> Self {
        if intensity > threshold {
            EdgeKind::Conflict
        } else {
            EdgeKind::Tension
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Conflict => "conflict",
            EdgeKind::Tension => "tension",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A conflict or tension line between two countries that share a cluster.
///
/// `from`/`to` keep the orientation of the first cluster that linked the pair; identity
/// is the unordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub intensity: f64,
}

impl Edge {
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AllianceLine {
    pub from: String,
    pub to: String,
    pub alliance: Bloc,
}

/// Order-independent key for a country pair.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Derive one edge per unordered country pair from multi-country clusters.
///
/// A repeated pair keeps the highest severity seen, and its kind is reclassified from
/// that intensity, so a pair first seen at 50 and later at 90 ends up a conflict.
/// Self-pairs from a cluster listing the same code twice are ignored, as are blank
/// codes. Output is in first-seen order.
pub fn build_conflict_edges(clusters: &[Cluster], threshold: f64) -> Vec<Edge> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for cluster in clusters.iter().filter(|c| c.is_multi_country()) {
        let codes = &cluster.countries;
        for i in 0..codes.len() {
            for j in (i + 1)..codes.len() {
                let (from, to) = (&codes[i], &codes[j]);
                if from == to || from.is_empty() || to.is_empty() {
                    continue;
                }
                let key = pair_key(from, to);
                match index.get(&key) {
                    Some(&pos) => {
                        let edge = &mut edges[pos];
                        edge.intensity = edge.intensity.max(cluster.severity);
                        edge.kind = EdgeKind::classify(edge.intensity, threshold);
                    }
                    None => {
                        index.insert(key, edges.len());
                        edges.push(Edge {
                            from: from.clone(),
                            to: to.clone(),
                            kind: EdgeKind::classify(cluster.severity, threshold),
                            intensity: cluster.severity,
                        });
                    }
                }
            }
        }
    }

    let conflicts = edges.iter().filter(|e| e.kind == EdgeKind::Conflict).count();
    debug!(edges = edges.len(), conflicts, "Built conflict edges");
    edges
}

/// Pair the first `fanout` members of each bloc.
///
/// Nothing is emitted unless `show_alliances` is on. Both endpoints must be known
/// countries and currently active (has data or on the watchlist). A pair shared by two
/// blocs yields one line per bloc.
pub fn build_alliance_edges(
    tables: &ReferenceTables,
    countries: &[Country],
    records: &RiskRecords,
    show_alliances: bool,
    fanout: usize,
) -> Vec<AllianceLine> {
    if !show_alliances {
        return Vec::new();
    }

    let known: HashSet<&str> = countries.iter().map(|c| c.code.as_str()).collect();
    let eligible = |code: &str| {
        known.contains(code) && records.get(code).is_some_and(|r| r.is_active())
    };

    let mut lines = Vec::new();
    for bloc in Bloc::ALL {
        let members = tables.members(bloc);
        let head = &members[..members.len().min(fanout)];
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for i in 0..head.len() {
            for j in (i + 1)..head.len() {
                let (from, to) = (&head[i], &head[j]);
                if from == to || !eligible(from.as_str()) || !eligible(to.as_str()) {
                    continue;
                }
                if !seen.insert(pair_key(from, to)) {
                    continue;
                }
                lines.push(AllianceLine {
                    from: from.clone(),
                    to: to.clone(),
                    alliance: bloc,
                });
            }
        }
    }

    debug!(lines = lines.len(), fanout, "Built alliance edges");
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CountryRiskRecord;
    use chrono::Utc;

    fn cluster(id: &str, countries: &[&str], severity: f64) -> Cluster {
        Cluster::new(id, countries, severity, Utc::now())
    }

    // --- conflict edges ---

    #[test]
    fn single_country_clusters_make_no_edges() {
        let edges = build_conflict_edges(&[cluster("c1", &["US"], 90.0)], 60.0);
        assert!(edges.is_empty());
    }

    #[test]
    fn three_country_cluster_makes_three_edges() {
        let edges = build_conflict_edges(&[cluster("c1", &["IL", "IR", "LB"], 70.0)], 60.0);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().any(|e| e.connects("IL", "IR")));
        assert!(edges.iter().any(|e| e.connects("IL", "LB")));
        assert!(edges.iter().any(|e| e.connects("IR", "LB")));
    }

    #[test]
    fn reversed_pair_merges_into_existing_edge() {
        let edges = build_conflict_edges(
            &[cluster("c1", &["CN", "TW"], 40.0), cluster("c2", &["TW", "CN"], 55.0)],
            60.0,
        );
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from, "CN");
        assert_eq!(edges[0].to, "TW");
        assert_eq!(edges[0].intensity, 55.0);
    }

    #[test]
    fn lower_severity_does_not_reduce_intensity() {
        let edges = build_conflict_edges(
            &[cluster("c1", &["IN", "PK"], 85.0), cluster("c2", &["PK", "IN"], 20.0)],
            60.0,
        );
        assert_eq!(edges[0].intensity, 85.0);
        assert_eq!(edges[0].kind, EdgeKind::Conflict);
    }

    #[test]
    fn duplicate_code_in_cluster_is_not_a_self_loop() {
        let edges = build_conflict_edges(&[cluster("c1", &["RS", "RS", "XK"], 50.0)], 60.0);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].connects("RS", "XK"));
    }

    #[test]
    fn blank_codes_are_not_paired() {
        let edges = build_conflict_edges(&[cluster("c1", &["", "SO", "ET"], 75.0)], 60.0);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].connects("SO", "ET"));
    }

    #[test]
    fn edge_kind_boundary() {
        assert_eq!(EdgeKind::classify(60.0, 60.0), EdgeKind::Tension);
        assert_eq!(EdgeKind::classify(60.01, 60.0), EdgeKind::Conflict);
    }

    #[test]
    fn edge_serializes_kind_as_type() {
        let edge = Edge {
            from: "US".to_string(),
            to: "RU".to_string(),
            kind: EdgeKind::Conflict,
            intensity: 70.0,
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["type"], "conflict");
    }

    // --- alliance edges ---

    fn active_records(codes: &[&str]) -> RiskRecords {
        codes
            .iter()
            .map(|c| {
                let mut r = CountryRiskRecord::new(false);
                r.has_data = true;
                (c.to_string(), r)
            })
            .collect()
    }

    fn countries(codes: &[&str]) -> Vec<Country> {
        codes.iter().map(|c| Country::new(c, c, "")).collect()
    }

    #[test]
    fn alliances_hidden_when_toggle_off() {
        let tables = ReferenceTables::builtin();
        let codes = ["US", "GB", "DE"];
        let lines =
            build_alliance_edges(&tables, &countries(&codes), &active_records(&codes), false, 8);
        assert!(lines.is_empty());
    }

    #[test]
    fn fanout_limits_pairs_per_bloc() {
        let tables = ReferenceTables {
            blocs: vec![(
                Bloc::Nato,
                ["US", "GB", "DE", "FR", "IT"].iter().map(|s| s.to_string()).collect(),
            )],
            ..ReferenceTables::builtin()
        };
        let codes = ["US", "GB", "DE", "FR", "IT"];
        let lines =
            build_alliance_edges(&tables, &countries(&codes), &active_records(&codes), true, 3);
        // First three members only: US-GB, US-DE, GB-DE.
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.from != "FR" && l.to != "FR"));
    }

    #[test]
    fn inactive_endpoint_suppresses_line() {
        let tables = ReferenceTables {
            blocs: vec![(
                Bloc::Brics,
                ["BR", "RU", "IN"].iter().map(|s| s.to_string()).collect(),
            )],
            ..ReferenceTables::builtin()
        };
        let mut records = active_records(&["BR", "RU"]);
        records.insert("IN".to_string(), CountryRiskRecord::new(false));
        let lines = build_alliance_edges(
            &tables,
            &countries(&["BR", "RU", "IN"]),
            &records,
            true,
            8,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].alliance, Bloc::Brics);
    }

    #[test]
    fn watchlist_counts_as_active() {
        let tables = ReferenceTables {
            blocs: vec![(Bloc::Sco, vec!["RU".to_string(), "CN".to_string()])],
            ..ReferenceTables::builtin()
        };
        let records: RiskRecords = ["RU", "CN"]
            .iter()
            .map(|c| (c.to_string(), CountryRiskRecord::new(true)))
            .collect();
        let lines =
            build_alliance_edges(&tables, &countries(&["RU", "CN"]), &records, true, 8);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn unknown_countries_are_not_paired() {
        let tables = ReferenceTables {
            blocs: vec![(Bloc::Asean, vec!["ID".to_string(), "MY".to_string()])],
            ..ReferenceTables::builtin()
        };
        // MY has a record (e.g. from an article) but is not in the country table.
        let records = active_records(&["ID", "MY"]);
        let lines = build_alliance_edges(&tables, &countries(&["ID"]), &records, true, 8);
        assert!(lines.is_empty());
    }
}
