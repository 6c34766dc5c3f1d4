//! The one color table. Renderers look colors up here instead of carrying their own
//! band thresholds.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use riskatlas_world::{Bloc, LayerToggles};

use crate::config::CombinedRisk;
use crate::graph::EdgeKind;
use crate::hotspot::RiskType;
use crate::record::CountryRiskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

// --- severity bands ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayBand {
    Minimal,
    Low,
    Elevated,
    High,
    Critical,
}

impl DisplayBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayBand::Minimal => "minimal",
            DisplayBand::Low => "low",
            DisplayBand::Elevated => "elevated",
            DisplayBand::High => "high",
            DisplayBand::Critical => "critical",
        }
    }

    pub fn color(&self) -> Rgba {
        match self {
            DisplayBand::Minimal => Rgba::new(34, 197, 94, 0.5),
            DisplayBand::Low => Rgba::new(251, 191, 36, 0.6),
            DisplayBand::Elevated => Rgba::new(217, 119, 6, 0.7),
            DisplayBand::High => Rgba::new(239, 68, 68, 0.7),
            DisplayBand::Critical => Rgba::new(220, 38, 38, 0.8),
        }
    }
}

impl std::fmt::Display for DisplayBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a 0–100 score to a display band. NaN is treated as no risk.
pub fn color_for(score: f64) -> DisplayBand {
    if score.is_nan() {
        return DisplayBand::Minimal;
    }
    match score {
        s if s >= 80.0 => DisplayBand::Critical,
        s if s >= 60.0 => DisplayBand::High,
        s if s >= 40.0 => DisplayBand::Elevated,
        s if s >= 20.0 => DisplayBand::Low,
        _ => DisplayBand::Minimal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StabilityBand {
    Unstable,
    Watch,
    Stable,
}

pub fn stability_band(score: f64) -> StabilityBand {
    if score < 70.0 {
        StabilityBand::Unstable
    } else if score < 85.0 {
        StabilityBand::Watch
    } else {
        StabilityBand::Stable
    }
}

// --- country fill ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    Stable,
    Moderate,
    Volatile,
}

/// What a country's fill means, before it becomes a color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "shade", rename_all = "snake_case")]
pub enum CountryShade {
    Crisis { intensity: f64 },
    Tension { intensity: f64 },
    Watchlist,
    /// Risk mode: has data, nothing alarming.
    Stable,
    /// Layer mode: has data, but nothing on the visible layers.
    Active,
    Quiet,
    Severity { band: DisplayBand },
    MediaAttention { intensity: f64 },
    MarketVolatility { level: VolatilityLevel },
}

impl CountryShade {
    pub fn color(&self) -> Rgba {
        match *self {
            CountryShade::Crisis { intensity } => {
                hotspot_color(RiskType::Crisis).with_alpha((0.4 + intensity * 0.6) as f32)
            }
            CountryShade::Tension { intensity } => {
                hotspot_color(RiskType::Tension).with_alpha((0.3 + intensity * 0.5) as f32)
            }
            CountryShade::Watchlist => hotspot_color(RiskType::Watchlist).with_alpha(0.5),
            CountryShade::Stable => Rgba::new(34, 197, 94, 0.3),
            CountryShade::Active => Rgba::new(156, 163, 175, 0.2),
            CountryShade::Quiet => Rgba::new(100, 100, 100, 0.05),
            CountryShade::Severity { band } => band.color(),
            CountryShade::MediaAttention { intensity } if intensity > 0.7 => {
                Rgba::new(59, 130, 246, (0.5 + intensity * 0.3) as f32)
            }
            CountryShade::MediaAttention { intensity } => {
                Rgba::new(96, 165, 250, (0.3 + intensity * 0.4) as f32)
            }
            CountryShade::MarketVolatility { level } => match level {
                VolatilityLevel::Volatile => Rgba::new(168, 85, 247, 0.7),
                VolatilityLevel::Moderate => Rgba::new(147, 51, 234, 0.5),
                VolatilityLevel::Stable => Rgba::new(196, 181, 253, 0.4),
            },
        }
    }
}

/// Pick a country's fill.
///
/// With no data layer visible the map is in risk mode and shades by combined risk and
/// stability. Otherwise the first visible layer with data for the country decides.
pub fn country_shade(
    record: &CountryRiskRecord,
    layers: &LayerToggles,
    policy: CombinedRisk,
) -> CountryShade {
    if layers.is_risk_mode() {
        return risk_mode_shade(record, policy);
    }

    if layers.clusters && record.cluster_count > 0 {
        let total = (record.max_severity + record.conflict_intensity * 0.2).min(100.0);
        return CountryShade::Severity {
            band: color_for(total),
        };
    }
    if layers.articles && record.article_count > 0 {
        let intensity = (f64::from(record.article_count) / 30.0).min(1.0);
        return CountryShade::MediaAttention { intensity };
    }
    if layers.markets && record.market_count > 0 {
        let volatility = (100.0 - record.stability_score).max(0.0);
        let level = if volatility > 50.0 {
            VolatilityLevel::Volatile
        } else if volatility > 25.0 {
            VolatilityLevel::Moderate
        } else {
            VolatilityLevel::Stable
        };
        return CountryShade::MarketVolatility { level };
    }

    if record.has_data {
        CountryShade::Active
    } else {
        CountryShade::Quiet
    }
}

fn risk_mode_shade(record: &CountryRiskRecord, policy: CombinedRisk) -> CountryShade {
    let risk = record.combined_risk(policy);
    let stability = record.stability_score;

    if risk > 60.0 {
        let intensity = ((risk - 60.0) / 40.0).min(1.0);
        return CountryShade::Crisis { intensity };
    }
    if risk > 30.0 || stability < 70.0 {
        let intensity = (risk / 60.0 + (100.0 - stability) / 100.0).min(1.0);
        return CountryShade::Tension { intensity };
    }
    if record.watchlist_status {
        CountryShade::Watchlist
    } else if record.has_data {
        CountryShade::Stable
    } else {
        CountryShade::Quiet
    }
}

// --- palettes ---

pub fn hotspot_color(risk_type: RiskType) -> Rgba {
    match risk_type {
        RiskType::Crisis => Rgba::opaque(220, 38, 38),
        RiskType::HighRisk => Rgba::opaque(239, 68, 68),
        RiskType::Tension => Rgba::opaque(217, 119, 6),
        RiskType::Watchlist => Rgba::opaque(245, 158, 11),
    }
}

pub fn bloc_color(bloc: Bloc) -> Rgba {
    match bloc {
        Bloc::Nato => Rgba::new(59, 130, 246, 0.4),
        Bloc::Eu => Rgba::new(34, 197, 94, 0.4),
        Bloc::Brics => Rgba::new(168, 85, 247, 0.4),
        Bloc::Sco => Rgba::new(236, 72, 153, 0.4),
        Bloc::Asean => Rgba::new(245, 158, 11, 0.4),
    }
}

pub fn edge_color(kind: EdgeKind) -> Rgba {
    match kind {
        EdgeKind::Conflict => Rgba::opaque(220, 38, 38),
        EdgeKind::Tension => Rgba::opaque(217, 119, 6),
    }
}
