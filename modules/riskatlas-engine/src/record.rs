use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::CombinedRisk;

/// Starting stability before any market volatility is observed.
pub const FULL_STABILITY: f64 = 100.0;

/// Per-country scores rebuilt from scratch on every recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CountryRiskRecord {
    pub cluster_count: u32,
    pub max_severity: f64,
    pub article_count: u32,
    pub market_count: u32,
    pub has_data: bool,
    /// Max of recency-weighted cluster severity. Not clamped: severities above 100 pass through.
    pub geopolitical_risk: f64,
    /// Sum of severity shares from multi-country clusters.
    pub conflict_intensity: f64,
    /// 0–100, reduced by market volatility.
    pub stability_score: f64,
    pub watchlist_status: bool,
    pub region_tension: f64,
}

impl CountryRiskRecord {
    pub fn new(watchlist: bool) -> Self {
        Self {
            cluster_count: 0,
            max_severity: 0.0,
            article_count: 0,
            market_count: 0,
            has_data: false,
            geopolitical_risk: 0.0,
            conflict_intensity: 0.0,
            stability_score: FULL_STABILITY,
            watchlist_status: watchlist,
            region_tension: 0.0,
        }
    }

    /// Whether the country is worth drawing alliance lines to.
    pub fn is_active(&self) -> bool {
        self.has_data || self.watchlist_status
    }

    pub fn combined_risk(&self, policy: CombinedRisk) -> f64 {
        policy.combine(self.geopolitical_risk, self.conflict_intensity, self.region_tension)
    }
}

impl Default for CountryRiskRecord {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Records keyed by country code. Ordered so output is deterministic.
pub type RiskRecords = BTreeMap<String, CountryRiskRecord>;
