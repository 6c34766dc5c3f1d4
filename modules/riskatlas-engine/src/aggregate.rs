//! Risk aggregation: folds clusters, articles and market quotes into one
//! [`CountryRiskRecord`] per country.
//!
//! Stages run in a fixed order:
//! 1. Seed a record for every known country
//! 2. Clusters → cluster_count, max_severity, geopolitical_risk, conflict_intensity
//! 3. Articles → article_count
//! 4. Market quotes → market_count, stability_score
//! 5. Region baseline → region_tension
//!
//! Codes that appear in a stream but not in the country table get a default
//! record on first reference.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use riskatlas_world::{
    Article, Cluster, Country, LayerKind, LayerToggles, MarketSymbolQuote, ReferenceTables,
};

use crate::config::EngineConfig;
use crate::record::{CountryRiskRecord, RiskRecords};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Stability points lost per percentage point of daily move.
const VOLATILITY_PENALTY: f64 = 10.0;

/// Baseline tension for a country in an allowlisted region, before cluster activity.
const REGION_TENSION_BASE: f64 = 30.0;
const REGION_TENSION_PER_CLUSTER: f64 = 10.0;

/// Linear recency weight: 1.0 at age 0, 0.0 at `window_days` or older.
///
/// Only floored: a cluster stamped after `as_of` weighs more than 1.0. One without a
/// usable timestamp counts as stale (0.0).
pub fn recency_factor(updated_at: Option<DateTime<Utc>>, as_of: DateTime<Utc>, window_days: f64) -> f64 {
    let Some(updated_at) = updated_at else {
        return 0.0;
    };
    let days_old = (as_of - updated_at).num_milliseconds() as f64 / MS_PER_DAY;
    (1.0 - days_old / window_days).max(0.0)
}

/// Builds risk records against a fixed set of reference tables, config and clock.
pub struct RiskAggregator<'a> {
    tables: &'a ReferenceTables,
    config: &'a EngineConfig,
    as_of: DateTime<Utc>,
}

impl<'a> RiskAggregator<'a> {
    pub fn new(tables: &'a ReferenceTables, config: &'a EngineConfig, as_of: DateTime<Utc>) -> Self {
        Self {
            tables,
            config,
            as_of,
        }
    }

    pub fn aggregate(
        &self,
        countries: &[Country],
        clusters: &[Cluster],
        articles: &[Article],
        market_symbols: &[MarketSymbolQuote],
        layers: LayerToggles,
    ) -> RiskRecords {
        let mut records = seed_records(countries);

        if layers.is_visible(LayerKind::Clusters) {
            self.apply_clusters(&mut records, clusters);
        }
        if layers.is_visible(LayerKind::Articles) {
            apply_articles(&mut records, articles);
        }
        if layers.is_visible(LayerKind::Markets) {
            apply_markets(&mut records, market_symbols);
        }
        self.apply_region_tension(&mut records, countries);

        let with_data = records.values().filter(|r| r.has_data).count();
        info!(
            countries = countries.len(),
            records = records.len(),
            with_data,
            clusters = clusters.len(),
            articles = articles.len(),
            market_symbols = market_symbols.len(),
            "Risk records aggregated"
        );

        records
    }

    fn apply_clusters(&self, records: &mut RiskRecords, clusters: &[Cluster]) {
        let mut stale = 0u32;
        for cluster in clusters {
            let recency =
                recency_factor(cluster.updated_at, self.as_of, self.config.recency_window_days);
            if recency == 0.0 {
                stale += 1;
            }
            let weighted = cluster.severity * recency;
            let share = if cluster.is_multi_country() {
                Some(cluster.severity / cluster.countries.len() as f64)
            } else {
                None
            };

            for code in cluster.countries.iter().filter(|c| !c.is_empty()) {
                let record = record_for(records, code);
                record.cluster_count += 1;
                record.max_severity = record.max_severity.max(cluster.severity);
                record.has_data = true;
                record.geopolitical_risk = record.geopolitical_risk.max(weighted);
                if let Some(share) = share {
                    record.conflict_intensity += share;
                }
            }
        }
        debug!(clusters = clusters.len(), stale, "Applied clusters");
    }

    fn apply_region_tension(&self, records: &mut RiskRecords, countries: &[Country]) {
        let by_code = index_countries(countries);
        let mut tense = 0u32;
        for (code, record) in records.iter_mut() {
            let Some(country) = by_code.get(code.as_str()) else {
                continue;
            };
            if self
                .tables
                .is_high_risk_region(&country.region, country.subregion.as_deref())
            {
                record.region_tension =
                    REGION_TENSION_BASE + record.cluster_count as f64 * REGION_TENSION_PER_CLUSTER;
                tense += 1;
            }
        }
        debug!(tense, "Applied region tension");
    }
}

fn seed_records(countries: &[Country]) -> RiskRecords {
    let mut records = RiskRecords::new();
    for country in countries {
        records
            .entry(country.code.clone())
            .or_insert_with(|| CountryRiskRecord::new(country.watchlist));
    }
    records
}

/// First row wins when the country table repeats a code.
fn index_countries(countries: &[Country]) -> HashMap<&str, &Country> {
    let mut by_code = HashMap::with_capacity(countries.len());
    for country in countries {
        by_code.entry(country.code.as_str()).or_insert(country);
    }
    by_code
}

fn record_for<'r>(records: &'r mut RiskRecords, code: &str) -> &'r mut CountryRiskRecord {
    records.entry(code.to_string()).or_default()
}

fn apply_articles(records: &mut RiskRecords, articles: &[Article]) {
    let mut mentions = 0u32;
    for article in articles {
        for code in article.countries.iter().filter(|c| !c.is_empty()) {
            let record = record_for(records, code);
            record.article_count += 1;
            record.has_data = true;
            mentions += 1;
        }
    }
    debug!(articles = articles.len(), mentions, "Applied articles");
}

fn apply_markets(records: &mut RiskRecords, market_symbols: &[MarketSymbolQuote]) {
    let mut quoted = 0u32;
    for symbol in market_symbols {
        let (Some(code), Some(volatility)) = (symbol.country.as_deref(), symbol.volatility()) else {
            continue;
        };
        if code.is_empty() {
            continue;
        }
        let record = record_for(records, code);
        record.market_count += 1;
        record.has_data = true;
        record.stability_score = (record.stability_score - volatility * VOLATILITY_PENALTY).max(0.0);
        quoted += 1;
    }
    debug!(symbols = market_symbols.len(), quoted, "Applied market quotes");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn aggregate(
        countries: &[Country],
        clusters: &[Cluster],
        articles: &[Article],
        markets: &[MarketSymbolQuote],
    ) -> RiskRecords {
        let tables = ReferenceTables::builtin();
        let config = EngineConfig::default();
        RiskAggregator::new(&tables, &config, now()).aggregate(
            countries,
            clusters,
            articles,
            markets,
            LayerToggles::all(),
        )
    }

    // --- recency_factor tests ---

    #[test]
    fn fresh_cluster_has_full_weight() {
        assert!((recency_factor(Some(now()), now(), 30.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn half_window_is_half_weight() {
        let updated = now() - Duration::days(15);
        assert!((recency_factor(Some(updated), now(), 30.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn weight_reaches_zero_at_window_and_stays_there() {
        assert_eq!(recency_factor(Some(now() - Duration::days(30)), now(), 30.0), 0.0);
        assert_eq!(recency_factor(Some(now() - Duration::days(45)), now(), 30.0), 0.0);
    }

    #[test]
    fn future_timestamp_weighs_more_than_fresh() {
        let updated = now() + Duration::days(3);
        assert!((recency_factor(Some(updated), now(), 30.0) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn future_cluster_scores_above_its_severity() {
        let clusters = vec![Cluster::new("c1", &["UA"], 80.0, now() + Duration::days(3))];
        let records = aggregate(&[], &clusters, &[], &[]);
        assert!((records["UA"].geopolitical_risk - 88.0).abs() < 1e-9);
    }

    #[test]
    fn missing_timestamp_is_stale() {
        assert_eq!(recency_factor(None, now(), 30.0), 0.0);
    }

    // --- aggregation stage tests ---

    #[test]
    fn single_country_cluster_adds_no_conflict_intensity() {
        let countries = vec![Country::new("FR", "France", "Europe")];
        let clusters = vec![Cluster::new("c1", &["FR"], 75.0, now())];
        let records = aggregate(&countries, &clusters, &[], &[]);

        let fr = &records["FR"];
        assert_eq!(fr.cluster_count, 1);
        assert_eq!(fr.conflict_intensity, 0.0);
        assert!((fr.geopolitical_risk - 75.0).abs() < 1e-9);
    }

    #[test]
    fn geopolitical_risk_takes_the_max_not_the_sum() {
        let countries = vec![Country::new("IR", "Iran", "Asia")];
        let clusters = vec![
            Cluster::new("c1", &["IR"], 40.0, now()),
            Cluster::new("c2", &["IR"], 65.0, now()),
            Cluster::new("c3", &["IR"], 20.0, now()),
        ];
        let records = aggregate(&countries, &clusters, &[], &[]);
        assert!((records["IR"].geopolitical_risk - 65.0).abs() < 1e-9);
        assert_eq!(records["IR"].max_severity, 65.0);
        assert_eq!(records["IR"].cluster_count, 3);
    }

    #[test]
    fn old_cluster_still_counts_and_sets_max_severity() {
        let countries = vec![Country::new("SD", "Sudan", "Africa")];
        let clusters = vec![Cluster::new("c1", &["SD"], 90.0, now() - Duration::days(60))];
        let records = aggregate(&countries, &clusters, &[], &[]);
        let sd = &records["SD"];
        assert_eq!(sd.cluster_count, 1);
        assert_eq!(sd.max_severity, 90.0);
        assert_eq!(sd.geopolitical_risk, 0.0);
        assert!(sd.has_data);
    }

    #[test]
    fn conflict_intensity_accumulates_across_clusters() {
        let countries = vec![
            Country::new("IL", "Israel", "Middle East"),
            Country::new("LB", "Lebanon", "Middle East"),
            Country::new("SY", "Syria", "Middle East"),
        ];
        let clusters = vec![
            Cluster::new("c1", &["IL", "LB"], 60.0, now()),
            Cluster::new("c2", &["IL", "LB", "SY"], 90.0, now()),
        ];
        let records = aggregate(&countries, &clusters, &[], &[]);
        assert!((records["IL"].conflict_intensity - 60.0).abs() < 1e-9);
        assert!((records["LB"].conflict_intensity - 60.0).abs() < 1e-9);
        assert!((records["SY"].conflict_intensity - 30.0).abs() < 1e-9);
    }

    #[test]
    fn articles_raise_activity_but_not_risk() {
        let countries = vec![Country::new("BR", "Brazil", "South America")];
        let articles = vec![Article::new("a1", &["BR"]), Article::new("a2", &["BR", "AR"])];
        let records = aggregate(&countries, &[], &articles, &[]);

        assert_eq!(records["BR"].article_count, 2);
        assert!(records["BR"].has_data);
        assert_eq!(records["BR"].geopolitical_risk, 0.0);
        // AR is not in the country table but still gets a record.
        assert_eq!(records["AR"].article_count, 1);
    }

    #[test]
    fn market_volatility_reduces_stability() {
        let countries = vec![Country::new("TR", "Turkey", "Asia")];
        let markets = vec![MarketSymbolQuote::new("XU100", "TR", -2.5)];
        let records = aggregate(&countries, &[], &[], &markets);
        assert_eq!(records["TR"].market_count, 1);
        assert!((records["TR"].stability_score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn symbols_without_country_or_quote_are_skipped() {
        let countries = vec![Country::new("JP", "Japan", "Asia")];
        let markets = vec![
            MarketSymbolQuote {
                symbol: Some("GLD".to_string()),
                country: None,
                quote: MarketSymbolQuote::new("GLD", "JP", 3.0).quote,
            },
            MarketSymbolQuote {
                symbol: Some("NKY".to_string()),
                country: Some("JP".to_string()),
                quote: None,
            },
        ];
        let records = aggregate(&countries, &[], &[], &markets);
        assert_eq!(records["JP"].market_count, 0);
        assert!(!records["JP"].has_data);
        assert_eq!(records["JP"].stability_score, 100.0);
    }

    #[test]
    fn empty_country_codes_never_become_records() {
        let clusters = vec![Cluster::new("c1", &["", "SD"], 60.0, now())];
        let articles = vec![Article::new("a1", &[""])];
        let markets = vec![MarketSymbolQuote::new("XAU", "", 4.0)];
        let records = aggregate(&[], &clusters, &articles, &markets);

        assert!(!records.contains_key(""));
        assert_eq!(records.len(), 1);
        // The blank slot still counts toward the split.
        assert_eq!(records["SD"].conflict_intensity, 30.0);
    }

    #[test]
    fn region_tension_grows_with_cluster_count() {
        let countries = vec![
            Country::new("UA", "Ukraine", "Europe").with_subregion("Eastern Europe"),
            Country::new("DE", "Germany", "Europe").with_subregion("Western Europe"),
        ];
        let clusters = vec![
            Cluster::new("c1", &["UA"], 50.0, now()),
            Cluster::new("c2", &["UA", "DE"], 50.0, now()),
        ];
        let records = aggregate(&countries, &clusters, &[], &[]);
        assert_eq!(records["UA"].region_tension, 50.0);
        assert_eq!(records["DE"].region_tension, 0.0);
    }

    #[test]
    fn quiet_country_in_tense_region_still_gets_baseline() {
        let countries = vec![Country::new("KP", "North Korea", "Asia").with_subregion("Korean Peninsula")];
        let records = aggregate(&countries, &[], &[], &[]);
        assert_eq!(records["KP"].region_tension, 30.0);
        assert!(!records["KP"].has_data);
    }

    #[test]
    fn unknown_codes_never_get_region_tension() {
        let clusters = vec![Cluster::new("c1", &["XX"], 50.0, now())];
        let records = aggregate(&[], &clusters, &[], &[]);
        assert_eq!(records["XX"].region_tension, 0.0);
        assert!(!records["XX"].watchlist_status);
    }

    #[test]
    fn repeated_country_rows_keep_the_first() {
        let countries = vec![
            Country::new("RU", "Russia", "Europe").on_watchlist(),
            Country::new("RU", "Russia", "Europe"),
        ];
        let records = aggregate(&countries, &[], &[], &[]);
        assert_eq!(records.len(), 1);
        assert!(records["RU"].watchlist_status);
    }
}
