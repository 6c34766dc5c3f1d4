//! Static reference tables: bloc membership, the high-risk region allowlist,
//! and approximate country centroids.
//!
//! The built-in tables are what the dashboard ships with. Callers that own their
//! own tables build a [`ReferenceTables`] directly.

use std::collections::BTreeMap;

use crate::types::Bloc;

/// Member lists in the order the dashboard draws them. Alliance fan-out takes a
/// prefix of each list, so order matters.
pub const NATO_MEMBERS: &[&str] = &[
    "US", "GB", "DE", "FR", "IT", "ES", "CA", "TR", "PL", "NL", "BE", "NO", "DK", "PT", "LU",
    "IS", "EE", "LV", "LT",
];
pub const EU_MEMBERS: &[&str] = &[
    "DE", "FR", "IT", "ES", "NL", "BE", "LU", "AT", "SE", "DK", "FI", "PT", "IE", "GR", "SI",
    "MT", "CY", "EE", "LV", "LT", "CZ", "SK", "HU", "PL", "HR", "RO", "BG",
];
pub const BRICS_MEMBERS: &[&str] = &["BR", "RU", "IN", "CN", "ZA", "IR", "EG", "ET", "UA"];
pub const SCO_MEMBERS: &[&str] = &["RU", "CN", "KZ", "KG", "TJ", "UZ", "IN", "PK", "IR"];
pub const ASEAN_MEMBERS: &[&str] = &[
    "ID", "MY", "SG", "TH", "VN", "PH", "MM", "KH", "LA", "BN", "TL",
];

/// Regions whose countries carry a standing tension baseline.
pub const HIGH_RISK_REGIONS: &[&str] = &[
    "Eastern Europe",
    "Middle East",
    "South China Sea",
    "Korean Peninsula",
];

pub fn bloc_members(bloc: Bloc) -> &'static [&'static str] {
    match bloc {
        Bloc::Nato => NATO_MEMBERS,
        Bloc::Eu => EU_MEMBERS,
        Bloc::Brics => BRICS_MEMBERS,
        Bloc::Sco => SCO_MEMBERS,
        Bloc::Asean => ASEAN_MEMBERS,
    }
}

/// `[lng, lat]` anchor points. Rough country centers, good enough to place a marker.
/// Named conflict zones that enrichment refers to without coordinates, as `[lng, lat]`.
pub const KNOWN_CONFLICT_ZONES: &[(&str, [f64; 2])] = &[
    ("Donbas", [38.0, 48.0]),
    ("Donbass", [38.0, 48.0]),
    ("Donetsk", [37.8, 48.0]),
    ("Luhansk", [39.3, 48.6]),
    ("Eastern Ukraine", [38.0, 48.0]),
    ("Crimea", [33.5, 45.0]),
    ("Gaza", [34.5, 31.4]),
    ("West Bank", [35.2, 31.9]),
    ("Kashmir", [74.8, 34.1]),
    ("Syria", [38.5, 35.0]),
    ("Yemen", [44.2, 15.4]),
    ("Libya", [17.0, 27.0]),
    ("Mali", [-3.0, 17.0]),
];

const CENTROIDS: &[(&str, [f64; 2])] = &[
    // Americas
    ("US", [-98.5, 39.8]),
    ("CA", [-106.3, 56.1]),
    ("MX", [-102.6, 23.6]),
    ("GT", [-90.2, 15.8]),
    ("BZ", [-88.5, 17.2]),
    ("HN", [-86.2, 15.2]),
    ("SV", [-88.9, 13.8]),
    ("NI", [-85.2, 12.9]),
    ("CR", [-84.0, 9.7]),
    ("PA", [-80.8, 8.5]),
    ("CU", [-77.8, 21.5]),
    ("HT", [-72.3, 19.0]),
    ("DO", [-70.2, 18.7]),
    ("JM", [-77.3, 18.1]),
    ("CO", [-74.3, 4.6]),
    ("VE", [-66.6, 6.4]),
    ("EC", [-78.2, -1.8]),
    ("PE", [-75.0, -9.2]),
    ("BO", [-63.6, -16.3]),
    ("BR", [-51.9, -14.2]),
    ("PY", [-58.4, -23.4]),
    ("UY", [-55.8, -32.5]),
    ("AR", [-63.6, -38.4]),
    ("CL", [-71.5, -35.7]),
    // Europe
    ("GB", [-3.4, 55.4]),
    ("IE", [-8.2, 53.4]),
    ("IS", [-19.0, 65.0]),
    ("FR", [2.2, 46.2]),
    ("DE", [10.5, 51.2]),
    ("IT", [12.6, 41.9]),
    ("ES", [-3.7, 40.5]),
    ("PT", [-8.2, 39.4]),
    ("NL", [5.3, 52.1]),
    ("BE", [4.5, 50.5]),
    ("LU", [6.1, 49.8]),
    ("CH", [8.2, 46.8]),
    ("AT", [14.6, 47.5]),
    ("SE", [18.6, 60.1]),
    ("NO", [8.5, 60.5]),
    ("DK", [9.5, 56.3]),
    ("FI", [25.7, 61.9]),
    ("PL", [19.1, 51.9]),
    ("CZ", [15.5, 49.8]),
    ("SK", [19.7, 48.7]),
    ("HU", [19.5, 47.2]),
    ("RO", [25.0, 45.9]),
    ("BG", [25.5, 42.7]),
    ("GR", [21.8, 39.1]),
    ("HR", [15.2, 45.1]),
    ("SI", [15.0, 46.2]),
    ("RS", [21.0, 44.0]),
    ("BA", [17.7, 43.9]),
    ("ME", [19.4, 42.7]),
    ("MK", [21.7, 41.6]),
    ("AL", [20.2, 41.2]),
    ("XK", [20.9, 42.6]),
    ("EE", [25.0, 58.6]),
    ("LV", [24.6, 56.9]),
    ("LT", [23.9, 55.2]),
    ("BY", [28.0, 53.7]),
    ("UA", [31.2, 48.4]),
    ("MD", [28.4, 47.4]),
    ("RU", [105.3, 61.5]),
    ("MT", [14.4, 35.9]),
    ("CY", [33.4, 35.1]),
    // Caucasus, Central and South Asia
    ("TR", [35.2, 39.0]),
    ("GE", [43.4, 42.3]),
    ("AM", [45.0, 40.1]),
    ("AZ", [47.6, 40.1]),
    ("KZ", [66.9, 48.0]),
    ("UZ", [64.6, 41.4]),
    ("TM", [59.6, 39.0]),
    ("TJ", [71.3, 38.9]),
    ("KG", [74.8, 41.2]),
    ("MN", [103.8, 46.9]),
    ("AF", [67.7, 33.9]),
    ("PK", [69.3, 30.4]),
    ("IN", [79.0, 20.6]),
    ("NP", [84.1, 28.4]),
    ("BT", [90.4, 27.5]),
    ("BD", [90.4, 23.7]),
    ("LK", [80.8, 7.9]),
    ("MV", [73.2, 3.2]),
    // East and Southeast Asia, Oceania
    ("CN", [104.2, 35.9]),
    ("JP", [138.3, 36.2]),
    ("KR", [127.8, 35.9]),
    ("KP", [127.5, 40.3]),
    ("TW", [121.0, 23.7]),
    ("ID", [113.9, -0.8]),
    ("MY", [102.0, 4.2]),
    ("SG", [103.8, 1.35]),
    ("TH", [101.0, 15.9]),
    ("VN", [108.3, 14.1]),
    ("PH", [121.8, 12.9]),
    ("MM", [96.0, 21.9]),
    ("KH", [105.0, 12.6]),
    ("LA", [102.5, 19.9]),
    ("BN", [114.7, 4.5]),
    ("TL", [125.7, -8.9]),
    ("AU", [133.8, -25.3]),
    ("NZ", [174.9, -40.9]),
    // Middle East
    ("IL", [34.9, 31.0]),
    ("PS", [35.2, 32.0]),
    ("LB", [35.9, 33.9]),
    ("SY", [39.0, 34.8]),
    ("JO", [36.2, 30.6]),
    ("IQ", [43.7, 33.2]),
    ("IR", [53.7, 32.4]),
    ("SA", [45.1, 23.9]),
    ("YE", [48.5, 15.6]),
    ("OM", [55.9, 21.5]),
    ("AE", [53.8, 23.4]),
    ("QA", [51.2, 25.4]),
    ("BH", [50.6, 26.0]),
    ("KW", [47.5, 29.3]),
    // Africa
    ("EG", [30.8, 26.8]),
    ("LY", [17.2, 26.3]),
    ("TN", [9.5, 33.9]),
    ("DZ", [1.7, 28.0]),
    ("MA", [-7.1, 31.8]),
    ("SD", [30.2, 12.9]),
    ("SS", [31.3, 6.9]),
    ("ET", [40.5, 9.1]),
    ("ER", [39.8, 15.2]),
    ("DJ", [42.6, 11.8]),
    ("SO", [46.2, 5.2]),
    ("KE", [37.9, 0.0]),
    ("UG", [32.3, 1.4]),
    ("TZ", [34.9, -6.4]),
    ("RW", [29.9, -1.9]),
    ("BI", [29.9, -3.4]),
    ("CD", [21.8, -4.0]),
    ("CG", [15.8, -0.2]),
    ("GA", [11.6, -0.8]),
    ("GQ", [10.3, 1.7]),
    ("CM", [12.4, 7.4]),
    ("CF", [20.9, 6.6]),
    ("TD", [18.7, 15.5]),
    ("NE", [8.1, 17.6]),
    ("ML", [-4.0, 17.6]),
    ("SN", [-14.5, 14.5]),
    ("GH", [-1.0, 7.9]),
    ("CI", [-5.5, 7.5]),
    ("NG", [8.7, 9.1]),
    ("AO", [17.9, -11.2]),
    ("ZM", [27.8, -13.1]),
    ("ZW", [29.2, -19.0]),
    ("MZ", [35.5, -18.7]),
    ("MW", [34.3, -13.3]),
    ("BW", [24.7, -22.3]),
    ("NA", [18.5, -23.0]),
    ("ZA", [22.9, -30.6]),
];

/// Built-in centroid lookup.
pub fn centroid(code: &str) -> Option<[f64; 2]> {
    CENTROIDS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, coords)| *coords)
}

/// True when the country's region equals, or its subregion contains, an allowlisted region.
pub fn matches_high_risk_region(allowlist: &[String], region: &str, subregion: Option<&str>) -> bool {
    allowlist.iter().any(|entry| {
        region == entry || subregion.is_some_and(|sub| sub.contains(entry.as_str()))
    })
}

/// The reference data the engine reads. Owned so the surrounding application can
/// substitute its own tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTables {
    /// Blocs in draw order, each with members in fan-out order.
    pub blocs: Vec<(Bloc, Vec<String>)>,
    pub high_risk_regions: Vec<String>,
    pub centroids: BTreeMap<String, [f64; 2]>,
    /// Zone name → `[lng, lat]`. Names match exactly.
    pub conflict_zones: BTreeMap<String, [f64; 2]>,
}

impl ReferenceTables {
    pub fn builtin() -> Self {
        Self {
            blocs: Bloc::ALL
                .iter()
                .map(|bloc| {
                    let members = bloc_members(*bloc).iter().map(|m| m.to_string()).collect();
                    (*bloc, members)
                })
                .collect(),
            high_risk_regions: HIGH_RISK_REGIONS.iter().map(|r| r.to_string()).collect(),
            centroids: CENTROIDS
                .iter()
                .map(|(code, coords)| (code.to_string(), *coords))
                .collect(),
            conflict_zones: KNOWN_CONFLICT_ZONES
                .iter()
                .map(|(name, coords)| (name.to_string(), *coords))
                .collect(),
        }
    }

    pub fn centroid(&self, code: &str) -> Option<[f64; 2]> {
        self.centroids.get(code).copied()
    }

    pub fn conflict_zone(&self, name: &str) -> Option<[f64; 2]> {
        self.conflict_zones.get(name).copied()
    }

    pub fn is_high_risk_region(&self, region: &str, subregion: Option<&str>) -> bool {
        matches_high_risk_region(&self.high_risk_regions, region, subregion)
    }

    pub fn members(&self, bloc: Bloc) -> &[String] {
        self.blocs
            .iter()
            .find(|(b, _)| *b == bloc)
            .map(|(_, members)| members.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}
