use std::path::Path;

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use riskatlas_world::{Article, Cluster, Country, LayerToggle, LayerToggles, MarketSymbolQuote};

use crate::error::EngineError;

/// Everything one recomputation reads. Collaborators that fail to load a stream hand
/// over an empty list, so every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub market_symbols: Vec<MarketSymbolQuote>,
    #[serde(default)]
    pub layers: Vec<LayerToggle>,
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }

    pub fn layer_toggles(&self) -> LayerToggles {
        LayerToggles::from_toggles(&self.layers)
    }
}
