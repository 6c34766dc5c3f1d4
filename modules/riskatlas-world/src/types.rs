use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::values::{lenient_json, lenient_timestamp};

// --- Reference Entities ---

/// A country row from the reference table. `code` is ISO-3166 alpha-2 and unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Country {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    #[serde(default)]
    pub watchlist: bool,
}

impl Country {
    pub fn new(code: &str, name: &str, region: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            subregion: None,
            watchlist: false,
        }
    }

    pub fn with_subregion(mut self, subregion: &str) -> Self {
        self.subregion = Some(subregion.to_string());
        self
    }

    pub fn on_watchlist(mut self) -> Self {
        self.watchlist = true;
        self
    }

    /// Display name, falling back to the code when the row has no name.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.code
        } else {
            &self.name
        }
    }
}

// --- Intelligence Streams ---

/// One detected geopolitical event. Severity and confidence are externally assigned 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Cluster {
    pub id: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub severity: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub article_count: u32,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[schemars(with = "Option<DateTime<Utc>>")]
    pub created_at: Option<DateTime<Utc>>,
    /// `None` when the row carried no usable timestamp; such clusters count as stale.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[schemars(with = "Option<DateTime<Utc>>")]
    pub updated_at: Option<DateTime<Utc>>,
    /// AI enrichment blob. A shape the engine can't read decodes to `None`.
    #[serde(default, deserialize_with = "lenient_json", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<ClusterEntities>")]
    pub entities: Option<ClusterEntities>,
}

impl Cluster {
    pub fn new(id: &str, countries: &[&str], severity: f64, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            severity,
            confidence: 0.0,
            article_count: 0,
            created_at: Some(updated_at),
            updated_at: Some(updated_at),
            entities: None,
        }
    }

    pub fn with_map_data(mut self, map_data: MapData) -> Self {
        self.entities = Some(ClusterEntities {
            map_data: Some(map_data),
        });
        self
    }

    pub fn map_data(&self) -> Option<&MapData> {
        self.entities.as_ref()?.map_data.as_ref()
    }

    pub fn is_multi_country(&self) -> bool {
        self.countries.len() > 1
    }
}

// --- Map Enrichment ---

/// The slice of a cluster's enrichment the engine reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClusterEntities {
    #[serde(default)]
    pub map_data: Option<MapData>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MapData {
    #[serde(default)]
    pub primary_locations: Vec<PrimaryLocation>,
    #[serde(default)]
    pub affected_regions: Vec<String>,
    /// Zone names such as "Donbas" or "Gaza", resolved against the known-zone table.
    #[serde(default)]
    pub conflict_zones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PrimaryLocation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<LatLng>,
    #[serde(default)]
    pub significance: Option<String>,
}

impl PrimaryLocation {
    pub fn new(name: &str, lat: f64, lng: f64) -> Self {
        Self {
            name: name.to_string(),
            coordinates: Some(LatLng {
                lat: Some(lat),
                lng: Some(lng),
            }),
            significance: None,
        }
    }

    pub fn significance(&self) -> Significance {
        self.significance
            .as_deref()
            .and_then(Significance::parse)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LatLng {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl LatLng {
    /// `[lng, lat]` when both parts are present and on the globe.
    pub fn to_lng_lat(&self) -> Option<[f64; 2]> {
        let (lat, lng) = (self.lat?, self.lng?);
        let on_globe = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
        on_globe.then_some([lng, lat])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Primary,
    #[default]
    Secondary,
    Tertiary,
}

impl Significance {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "primary" => Some(Significance::Primary),
            "secondary" => Some(Significance::Secondary),
            "tertiary" => Some(Significance::Tertiary),
            _ => None,
        }
    }
}

/// An article only contributes activity counts, never risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[schemars(with = "Option<DateTime<Utc>>")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(id: &str, countries: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            published_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MarketQuote {
    #[serde(default)]
    pub change_percent: Option<f64>,
}

/// A market symbol joined with its latest quote. A failed quote fetch arrives as `quote: None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MarketSymbolQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub quote: Option<MarketQuote>,
}

impl MarketSymbolQuote {
    pub fn new(symbol: &str, country: &str, change_percent: f64) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            country: Some(country.to_string()),
            quote: Some(MarketQuote {
                change_percent: Some(change_percent),
            }),
        }
    }

    /// Absolute daily move, with a missing percentage counting as flat.
    pub fn volatility(&self) -> Option<f64> {
        self.quote
            .map(|q| q.change_percent.unwrap_or(0.0).abs())
    }
}

// --- Layers ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    Clusters,
    Articles,
    Markets,
    AiLocations,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Clusters => "clusters",
            LayerKind::Articles => "articles",
            LayerKind::Markets => "markets",
            LayerKind::AiLocations => "ai-locations",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "clusters" => Some(LayerKind::Clusters),
            "articles" => Some(LayerKind::Articles),
            "markets" => Some(LayerKind::Markets),
            "ai-locations" => Some(LayerKind::AiLocations),
            _ => None,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A layer switch as the dashboard sends it. Unrecognized ids are kept but ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LayerToggle {
    pub id: String,
    #[serde(default)]
    pub visible: bool,
}

impl LayerToggle {
    pub fn new(kind: LayerKind, visible: bool) -> Self {
        Self {
            id: kind.as_str().to_string(),
            visible,
        }
    }
}

/// Resolved visibility of the layers the engine reads.
///
/// A layer missing from the toggle list is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LayerToggles {
    pub clusters: bool,
    pub articles: bool,
    pub markets: bool,
    /// AI-enriched location markers. Not a data layer, so it never leaves risk mode.
    pub ai_locations: bool,
}

impl LayerToggles {
    pub fn all() -> Self {
        Self {
            clusters: true,
            articles: true,
            markets: true,
            ai_locations: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_toggles(toggles: &[LayerToggle]) -> Self {
        let mut resolved = Self::none();
        for toggle in toggles {
            match LayerKind::parse(&toggle.id) {
                Some(LayerKind::Clusters) => resolved.clusters |= toggle.visible,
                Some(LayerKind::Articles) => resolved.articles |= toggle.visible,
                Some(LayerKind::Markets) => resolved.markets |= toggle.visible,
                Some(LayerKind::AiLocations) => resolved.ai_locations |= toggle.visible,
                None => {}
            }
        }
        resolved
    }

    pub fn is_visible(&self, kind: LayerKind) -> bool {
        match kind {
            LayerKind::Clusters => self.clusters,
            LayerKind::Articles => self.articles,
            LayerKind::Markets => self.markets,
            LayerKind::AiLocations => self.ai_locations,
        }
    }

    /// True when no data layer is on, which puts country shading into risk mode.
    pub fn is_risk_mode(&self) -> bool {
        !self.clusters && !self.articles && !self.markets
    }
}

// --- Blocs ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bloc {
    Nato,
    Eu,
    Brics,
    Sco,
    Asean,
}

impl Bloc {
    pub const ALL: [Bloc; 5] = [Bloc::Nato, Bloc::Eu, Bloc::Brics, Bloc::Sco, Bloc::Asean];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bloc::Nato => "NATO",
            Bloc::Eu => "EU",
            Bloc::Brics => "BRICS",
            Bloc::Sco => "SCO",
            Bloc::Asean => "ASEAN",
        }
    }
}

impl std::fmt::Display for Bloc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_layer_is_hidden() {
        let layers = LayerToggles::from_toggles(&[LayerToggle::new(LayerKind::Clusters, true)]);
        assert!(layers.clusters);
        assert!(!layers.articles);
        assert!(!layers.markets);
    }

    #[test]
    fn ai_locations_do_not_leave_risk_mode() {
        let layers = LayerToggles::from_toggles(&[
            LayerToggle::new(LayerKind::AiLocations, true),
            LayerToggle {
                id: "heatmap".to_string(),
                visible: true,
            },
        ]);
        assert!(layers.is_visible(LayerKind::AiLocations));
        assert!(layers.is_risk_mode());
    }

    #[test]
    fn unreadable_entities_decode_to_none() {
        let cluster: Cluster = serde_json::from_str(
            r#"{"id":"c1","countries":["UA"],"entities":{"map_data":"n/a"}}"#,
        )
        .unwrap();
        assert!(cluster.entities.is_none());
        assert_eq!(cluster.countries, vec!["UA".to_string()]);
    }

    #[test]
    fn map_data_decodes_from_enrichment_blob() {
        let cluster: Cluster = serde_json::from_str(
            r#"{"id":"c1","countries":["UA"],"entities":{
                "executive_summary":"...",
                "map_data":{
                    "primary_locations":[{"name":"Kyiv","coordinates":{"lat":50.45,"lng":30.52},"significance":"primary"}],
                    "conflict_zones":["Donbas"]
                }}}"#,
        )
        .unwrap();
        let map_data = cluster.map_data().unwrap();
        assert_eq!(map_data.primary_locations[0].significance(), Significance::Primary);
        assert_eq!(map_data.conflict_zones, vec!["Donbas".to_string()]);
    }

    #[test]
    fn unknown_significance_falls_back_to_secondary() {
        let loc = PrimaryLocation {
            significance: Some("high".to_string()),
            ..PrimaryLocation::new("Aden", 12.8, 45.0)
        };
        assert_eq!(loc.significance(), Significance::Secondary);
    }

    #[test]
    fn off_globe_or_partial_coordinates_are_unplaceable() {
        assert_eq!(
            LatLng { lat: Some(31.5), lng: Some(34.47) }.to_lng_lat(),
            Some([34.47, 31.5])
        );
        assert!(LatLng { lat: Some(31.5), lng: None }.to_lng_lat().is_none());
        assert!(LatLng { lat: Some(95.0), lng: Some(10.0) }.to_lng_lat().is_none());
    }

    #[test]
    fn quote_without_change_percent_is_flat() {
        let symbol = MarketSymbolQuote {
            symbol: Some("XYZ".to_string()),
            country: Some("US".to_string()),
            quote: Some(MarketQuote::default()),
        };
        assert_eq!(symbol.volatility(), Some(0.0));
    }

    #[test]
    fn missing_quote_has_no_volatility() {
        let symbol = MarketSymbolQuote {
            symbol: None,
            country: Some("US".to_string()),
            quote: None,
        };
        assert_eq!(symbol.volatility(), None);
    }

    #[test]
    fn negative_moves_count_as_volatility() {
        let symbol = MarketSymbolQuote::new("IMOEX", "RU", -4.5);
        assert_eq!(symbol.volatility(), Some(4.5));
    }

    #[test]
    fn cluster_rows_with_bad_timestamps_still_decode() {
        let cluster: Cluster = serde_json::from_str(
            r#"{"id":"c1","countries":["US"],"severity":40,"updated_at":"not a date","created_at":null}"#,
        )
        .unwrap();
        assert!(cluster.updated_at.is_none());
        assert!(cluster.created_at.is_none());
        assert_eq!(cluster.severity, 40.0);
    }

    #[test]
    fn bloc_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Bloc::Brics).unwrap(), "\"BRICS\"");
        assert_eq!(Bloc::Asean.to_string(), "ASEAN");
    }
}
