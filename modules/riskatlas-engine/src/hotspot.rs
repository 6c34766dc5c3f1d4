use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use riskatlas_world::{Country, ReferenceTables};

use crate::config::CombinedRisk;
use crate::record::{CountryRiskRecord, RiskRecords};

/// Combined risk above this, or conflict intensity above [`CRISIS_CONFLICT`], is a crisis.
pub const CRISIS_RISK: f64 = 60.0;
pub const CRISIS_CONFLICT: f64 = 50.0;
/// Geopolitical risk above this is high-risk.
pub const HIGH_RISK_GEOPOLITICAL: f64 = 40.0;
pub const TENSION_RISK: f64 = 30.0;
/// Hotspots above this get an on-map label.
pub const LABEL_RISK: f64 = 50.0;
/// Display ceiling for `risk_level`.
pub const MAX_RISK_LEVEL: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RiskType {
    Crisis,
    HighRisk,
    Tension,
    Watchlist,
}

impl RiskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskType::Crisis => "crisis",
            RiskType::HighRisk => "high-risk",
            RiskType::Tension => "tension",
            RiskType::Watchlist => "watchlist",
        }
    }
}

impl std::fmt::Display for RiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hotspot {
    pub code: String,
    pub name: String,
    /// `[lng, lat]`
    pub coordinates: [f64; 2],
    /// Combined risk, capped at 100 for display.
    pub risk_level: f64,
    pub risk_type: RiskType,
    /// Country name when the point is hot enough to label, otherwise empty.
    pub label: String,
}

/// Band a record, first match wins. `None` means the country is not a hotspot.
pub fn classify_risk(record: &CountryRiskRecord, policy: CombinedRisk) -> Option<RiskType> {
    let risk_level = record.combined_risk(policy);

    if risk_level > CRISIS_RISK || record.conflict_intensity > CRISIS_CONFLICT {
        return Some(RiskType::Crisis);
    }
    if record.geopolitical_risk > HIGH_RISK_GEOPOLITICAL || record.watchlist_status {
        return Some(RiskType::HighRisk);
    }
    if risk_level > TENSION_RISK {
        return Some(RiskType::Tension);
    }
    // Watchlist countries already land in high-risk above.
    if record.watchlist_status {
        return Some(RiskType::Watchlist);
    }
    None
}

/// Threshold records into a ranked hotspot list.
///
/// Countries without a centroid are skipped. Ranking is by `risk_level` descending,
/// then country code.
pub fn classify(
    records: &RiskRecords,
    countries: &[Country],
    tables: &ReferenceTables,
    policy: CombinedRisk,
) -> Vec<Hotspot> {
    let names: HashMap<&str, &Country> = countries.iter().rev().map(|c| (c.code.as_str(), c)).collect();

    let mut unplaced = 0u32;
    let mut hotspots: Vec<Hotspot> = records
        .iter()
        .filter_map(|(code, record)| {
            let risk_type = classify_risk(record, policy)?;
            let Some(coordinates) = tables.centroid(code) else {
                unplaced += 1;
                return None;
            };
            let risk_level = record.combined_risk(policy);
            let name = names
                .get(code.as_str())
                .map(|c| c.display_name().to_string())
                .unwrap_or_else(|| code.clone());
            let label = if risk_level > LABEL_RISK {
                name.clone()
            } else {
                String::new()
            };
            Some(Hotspot {
                code: code.clone(),
                name,
                coordinates,
                risk_level: risk_level.min(MAX_RISK_LEVEL),
                risk_type,
                label,
            })
        })
        .collect();

    hotspots.sort_by(|a, b| {
        b.risk_level
            .total_cmp(&a.risk_level)
            .then_with(|| a.code.cmp(&b.code))
    });

    debug!(hotspots = hotspots.len(), unplaced, "Classified hotspots");
    hotspots
}
