use std::env;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;

/// Clusters older than this many days contribute nothing to geopolitical risk.
pub const RECENCY_WINDOW_DAYS: f64 = 30.0;

/// Only the first K members of each bloc are paired into alliance lines.
pub const ALLIANCE_FANOUT: usize = 8;

/// Accepted range for an overridden fan-out.
pub const ALLIANCE_FANOUT_RANGE: std::ops::RangeInclusive<usize> = 5..=8;

/// Edges with intensity strictly above this are conflicts; at or below, tensions.
pub const CONFLICT_EDGE_THRESHOLD: f64 = 60.0;

/// How a country's component scores fold into one hotspot ranking score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CombinedRisk {
    /// `max(geopolitical_risk, conflict_intensity, region_tension)`
    #[default]
    Max,
    /// `geopolitical_risk + region_tension`, kept to reproduce the choropleth shading variant.
    Additive,
}

impl CombinedRisk {
    pub fn combine(&self, geopolitical_risk: f64, conflict_intensity: f64, region_tension: f64) -> f64 {
        match self {
            CombinedRisk::Max => geopolitical_risk.max(conflict_intensity).max(region_tension),
            CombinedRisk::Additive => geopolitical_risk + region_tension,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CombinedRisk::Max => "max",
            CombinedRisk::Additive => "additive",
        }
    }
}

impl FromStr for CombinedRisk {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(CombinedRisk::Max),
            "additive" | "sum" => Ok(CombinedRisk::Additive),
            other => Err(EngineError::Config(format!(
                "unknown combined risk policy '{other}' (expected 'max' or 'additive')"
            ))),
        }
    }
}

impl std::fmt::Display for CombinedRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Engine tunables. Every key is optional; defaults are the documented constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    pub recency_window_days: f64,
    pub alliance_fanout: usize,
    pub conflict_edge_threshold: f64,
    pub combined_risk: CombinedRisk,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recency_window_days: RECENCY_WINDOW_DAYS,
            alliance_fanout: ALLIANCE_FANOUT,
            conflict_edge_threshold: CONFLICT_EDGE_THRESHOLD,
            combined_risk: CombinedRisk::Max,
        }
    }
}

impl EngineConfig {
    /// Load from `RISKATLAS_*` environment variables.
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. `from_env` is this over the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            recency_window_days: optional(
                &lookup,
                "RISKATLAS_RECENCY_WINDOW_DAYS",
                defaults.recency_window_days,
            )?,
            alliance_fanout: optional(&lookup, "RISKATLAS_ALLIANCE_FANOUT", defaults.alliance_fanout)?,
            conflict_edge_threshold: optional(
                &lookup,
                "RISKATLAS_CONFLICT_EDGE_THRESHOLD",
                defaults.conflict_edge_threshold,
            )?,
            combined_risk: optional(&lookup, "RISKATLAS_COMBINED_RISK", defaults.combined_risk)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.recency_window_days.is_finite() || self.recency_window_days <= 0.0 {
            return Err(EngineError::Config(format!(
                "recency window must be a positive number of days, got {}",
                self.recency_window_days
            )));
        }
        if !ALLIANCE_FANOUT_RANGE.contains(&self.alliance_fanout) {
            return Err(EngineError::Config(format!(
                "alliance fan-out must be between {} and {}, got {}",
                ALLIANCE_FANOUT_RANGE.start(),
                ALLIANCE_FANOUT_RANGE.end(),
                self.alliance_fanout
            )));
        }
        if !self.conflict_edge_threshold.is_finite() {
            return Err(EngineError::Config(
                "conflict edge threshold must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!(
            recency_window_days = self.recency_window_days,
            alliance_fanout = self.alliance_fanout,
            conflict_edge_threshold = self.conflict_edge_threshold,
            combined_risk = %self.combined_risk,
            "Risk engine config"
        );
    }
}

fn optional<F, T>(lookup: &F, key: &str, default: T) -> Result<T, EngineError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| EngineError::Config(format!("{key}: {e}"))),
        _ => Ok(default),
    }
}
