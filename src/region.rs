use crate::models::{Coordinate, ResolvedRegion, UNKNOWN_REGION};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Lowercased alias -> canonical region name.
const SYNONYMS: &[(&str, &str)] = &[
    ("iraq", "Iraq"),
    ("iran", "Iran"),
    ("usa", "United States"),
    ("us", "United States"),
    ("u.s.", "United States"),
    ("u.s.a.", "United States"),
    ("united states of america", "United States"),
    ("uk", "United Kingdom"),
    ("u.k.", "United Kingdom"),
    ("uae", "United Arab Emirates"),
    ("vietnam", "Viet Nam"),
    ("syria", "Syrian Arab Republic"),
    ("laos", "Lao People's Democratic Republic"),
];

const REGION_COORDINATES: &[(&str, f64, f64)] = &[
    ("United States", 37.0902, -95.7129),
    ("Pakistan", 30.3753, 69.3451),
    ("India", 20.5937, 78.9629),
    ("Yemen", 15.5527, 48.5164),
    ("Iraq", 33.2232, 43.6793),
    ("United Kingdom", 55.3781, -3.4360),
    ("Germany", 51.1657, 10.4515),
    ("Canada", 56.1304, -106.3468),
    ("Turkey", 38.9637, 35.2433),
    ("Lebanon", 33.8547, 35.8623),
    ("Nigeria", 9.0820, 8.6753),
    ("West Asia", 32.0000, 40.0000),
    ("Afghanistan", 33.9391, 67.7100),
    ("France", 46.2276, 2.2137),
    ("Europe", 54.5260, 15.2551),
    ("Sweden", 60.1282, 18.6435),
    ("Iran", 32.4279, 53.6880),
    ("Indonesia", -0.7893, 113.9213),
    ("Netherlands", 52.1326, 5.2913),
    ("United Arab Emirates", 23.4241, 53.8478),
    ("Australia", -25.2744, 133.7751),
    ("Saudi Arabia", 23.8859, 45.0792),
    ("North America", 54.5260, -105.2551),
    ("Oman", 21.4735, 55.9754),
    ("Bahrain", 26.0667, 50.5577),
    ("Mexico", 23.6345, -102.5528),
    ("Kenya", -1.2921, 36.8219),
    ("South Asia", 24.5937, 78.9629),
    ("Japan", 36.2048, 138.2529),
    ("Italy", 41.8719, 12.5674),
    ("Spain", 40.4637, -3.7492),
    ("Bangladesh", 23.6850, 90.3563),
    ("Egypt", 26.8206, 30.8025),
    ("Brazil", -14.2350, -51.9253),
    ("Kuwait", 29.3117, 47.4818),
    ("Malaysia", 4.2105, 101.9758),
    ("Austria", 47.5162, 14.5501),
    ("Ghana", 7.9465, -1.0232),
    ("Switzerland", 46.8182, 8.2275),
    ("South Africa", -30.5595, 22.9375),
    ("Poland", 51.9194, 19.1451),
    ("Belgium", 50.5039, 4.4699),
    ("Norway", 60.4720, 8.4689),
    ("Colombia", 4.5709, -74.2973),
    ("Qatar", 25.3548, 51.1839),
    ("Argentina", -38.4161, -63.6167),
    ("Hong Kong", 22.3193, 114.1694),
    ("Bulgaria", 42.7339, 25.4858),
    ("Algeria", 28.0339, 1.6596),
    ("Peru", -9.1900, -75.0152),
    ("Ireland", 53.1424, -7.6921),
    ("Africa", -8.7832, 34.5085),
    ("Australasia", -35.2744, 145.7751),
    ("Uganda", 1.3733, 32.2903),
    ("Portugal", 39.3999, -8.2245),
    ("New Zealand", -40.9006, 174.8860),
    ("Maldives", 3.2028, 73.2207),
    ("Finland", 61.9241, 25.7482),
    ("East Asia & Pacific", 15.0000, 125.0000),
    ("Thailand", 15.8700, 100.9925),
    ("South America", -15.6006, -56.1004),
    ("Senegal", 14.4974, -14.4524),
    ("Panama", 8.5380, -80.7821),
    ("North Africa", 30.0000, 10.0000),
    ("Morocco", 31.7917, -7.0926),
    ("Libya", 26.3351, 17.2283),
    ("Cyprus", 35.1264, 33.4299),
    ("Congo", -0.2280, 15.8277),
    ("Chile", -35.6751, -71.5430),
    ("Azerbaijan", 40.1431, 47.5769),
    ("Tunisia", 33.8869, 9.5375),
    ("Romania", 45.9432, 24.9668),
    ("Paraguay", -23.4425, -58.4438),
    ("Niger", 17.6078, 8.0817),
    ("Israel", 31.0461, 34.8516),
    ("Greece", 39.0742, 21.8243),
    ("Ethiopia", 9.1450, 40.4897),
    ("Denmark", 56.2639, 9.5018),
    ("Côte d'Ivoire", 7.5400, -5.5471),
    ("Czech Republic", 49.8175, 15.4730),
    ("Burkina Faso", 12.2383, -1.5616),
    ("Zimbabwe", -19.0154, 29.1549),
    ("Taiwan", 23.6978, 120.9605),
    ("Somalia", 5.1521, 46.1996),
    ("Slovenia", 46.1512, 14.9955),
    ("Mozambique", -18.6657, 35.5296),
    ("Mali", 17.5707, -3.9962),
    ("Kazakhstan", 48.0196, 66.9237),
    ("Jordan", 30.5852, 36.2384),
    ("Georgia", 42.3154, 43.3569),
    ("Ecuador", -1.8312, -78.1834),
    ("Croatia", 45.1000, 15.2000),
    ("Costa Rica", 9.7489, -83.7534),
    ("Viet Nam", 14.0583, 108.2772),
    ("Uzbekistan", 41.3775, 64.5853),
    ("Uruguay", -32.5228, -55.7658),
    ("Ukraine", 48.3794, 31.1656),
    ("Trinidad and Tobago", 10.6918, -61.2225),
    ("Syrian Arab Republic", 34.8021, 38.9968),
    ("Sudan", 12.8628, 30.2176),
    ("Sri Lanka", 7.8731, 80.7718),
    ("Singapore", 1.3521, 103.8198),
    ("Serbia", 44.0165, 21.0059),
    ("Rwanda", -1.9403, 29.8739),
    ("Nicaragua", 12.8654, -85.2072),
    ("Nepal", 28.3949, 84.1240),
    ("Malta", 35.9375, 14.3754),
    ("Macao", 22.1987, 113.5439),
    ("Lithuania", 55.1694, 23.8813),
    ("Latvia", 56.8796, 24.6032),
    ("Lao People's Democratic Republic", 19.8563, 102.4955),
    ("Hungary", 47.1625, 19.5033),
    ("Guinea", 9.9456, -9.6966),
    ("Estonia", 58.5953, 25.0136),
    ("Djibouti", 11.8251, 42.5903),
    ("Cambodia", 12.5657, 104.9910),
    ("Brunei Darussalam", 4.5353, 114.7277),
    ("Armenia", 40.0691, 45.0382),
    ("Andorra", 42.5063, 1.5218),
    ("Albania", 41.1533, 20.1683),
];

/// Canonical regions keyed by their lowercased name.
static REGION_INDEX: Lazy<HashMap<String, (&'static str, Coordinate)>> = Lazy::new(|| {
    REGION_COORDINATES
        .iter()
        .map(|(name, lat, lng)| (name.to_lowercase(), (*name, Coordinate::new(*lat, *lng))))
        .collect()
});

static SYNONYM_INDEX: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SYNONYMS.iter().copied().collect());

/// Maps free-text location labels to canonical regions. Total: every label,
/// including a missing one, resolves to something.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionResolver;

impl RegionResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, label: Option<&str>) -> ResolvedRegion {
        let name = self.canonical_name(label);
        match REGION_INDEX.get(&name.to_lowercase()) {
            Some((_, coordinate)) => ResolvedRegion {
                canonical_name: name,
                coordinate: *coordinate,
                mapped: true,
            },
            None => ResolvedRegion {
                canonical_name: name,
                coordinate: Coordinate::SENTINEL,
                mapped: false,
            },
        }
    }

    /// Canonical name only, without the coordinate lookup.
    pub fn canonical_name(&self, label: Option<&str>) -> String {
        let collapsed = match label {
            Some(label) => WHITESPACE_RUN.replace_all(label.trim(), " ").into_owned(),
            None => String::new(),
        };
        if collapsed.is_empty() {
            return UNKNOWN_REGION.to_string();
        }

        let folded = collapsed.to_lowercase();
        if let Some(canonical) = SYNONYM_INDEX.get(folded.as_str()) {
            return (*canonical).to_string();
        }
        match REGION_INDEX.get(&folded) {
            Some((canonical, _)) => (*canonical).to_string(),
            None => collapsed,
        }
    }
}
