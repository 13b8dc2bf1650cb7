//! Static observation locations.
//!
//! Locations only label output and feed the latitude into the aurora
//! estimate; nothing here does astronomy.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Location used when a caller does not pick one.
pub const DEFAULT_LOCATION: &str = "bangalore";

/// Locations watched by the monitoring loop when none are configured.
pub const DEFAULT_MONITORED: &[&str] = &["bangalore", "new_york", "london"];

/// Shortcut locations offered by the front end.
pub const QUICK_ACCESS: &[&str] = &["new_york", "london", "tokyo", "sydney"];

/// A named observation point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    pub continent: String,
}

impl Location {
    /// Placeholder for ids that are not in the table.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            lat: 0.0,
            lon: 0.0,
            country: "Unknown".to_string(),
            continent: "Unknown".to_string(),
        }
    }
}

fn loc(id: &str, name: &str, lat: f64, lon: f64, country: &str, continent: &str) -> Location {
    Location {
        id: id.to_string(),
        name: name.to_string(),
        lat,
        lon,
        country: country.to_string(),
        continent: continent.to_string(),
    }
}

lazy_static! {
    /// All known locations in display order.
    static ref LOCATIONS: Vec<Location> = vec![
        loc("bangalore", "Bangalore, India", 12.9716, 77.5946, "India", "Asia"),
        loc("delhi", "Delhi, India", 28.7041, 77.1025, "India", "Asia"),
        loc("mumbai", "Mumbai, India", 19.076, 72.8777, "India", "Asia"),
        loc("chennai", "Chennai, India", 13.0827, 80.2707, "India", "Asia"),
        loc("kolkata", "Kolkata, India", 22.5726, 88.3639, "India", "Asia"),
        loc("hyderabad", "Hyderabad, India", 17.385, 78.4867, "India", "Asia"),
        loc("pune", "Pune, India", 18.5204, 73.8567, "India", "Asia"),
        loc("ahmedabad", "Ahmedabad, India", 23.0225, 72.5714, "India", "Asia"),
        loc("tokyo", "Tokyo, Japan", 35.6762, 139.6503, "Japan", "Asia"),
        loc("beijing", "Beijing, China", 39.9042, 116.4074, "China", "Asia"),
        loc("shanghai", "Shanghai, China", 31.2304, 121.4737, "China", "Asia"),
        loc("singapore", "Singapore", 1.3521, 103.8198, "Singapore", "Asia"),
        loc("seoul", "Seoul, South Korea", 37.5665, 126.978, "South Korea", "Asia"),
        loc("bangkok", "Bangkok, Thailand", 13.7563, 100.5018, "Thailand", "Asia"),
        loc("kualalumpur", "Kuala Lumpur, Malaysia", 3.139, 101.6869, "Malaysia", "Asia"),
        loc("manila", "Manila, Philippines", 14.5995, 120.9842, "Philippines", "Asia"),
        loc("jakarta", "Jakarta, Indonesia", -6.2088, 106.8456, "Indonesia", "Asia"),
        loc("hanoi", "Hanoi, Vietnam", 21.0278, 105.8342, "Vietnam", "Asia"),
        loc("london", "London, UK", 51.5074, -0.1278, "UK", "Europe"),
        loc("paris", "Paris, France", 48.8566, 2.3522, "France", "Europe"),
        loc("berlin", "Berlin, Germany", 52.52, 13.405, "Germany", "Europe"),
        loc("rome", "Rome, Italy", 41.9028, 12.4964, "Italy", "Europe"),
        loc("madrid", "Madrid, Spain", 40.4168, -3.7038, "Spain", "Europe"),
        loc("amsterdam", "Amsterdam, Netherlands", 52.3676, 4.9041, "Netherlands", "Europe"),
        loc("brussels", "Brussels, Belgium", 50.8503, 4.3517, "Belgium", "Europe"),
        loc("vienna", "Vienna, Austria", 48.2082, 16.3738, "Austria", "Europe"),
        loc("prague", "Prague, Czech Republic", 50.0755, 14.4378, "Czech Republic", "Europe"),
        loc("budapest", "Budapest, Hungary", 47.4979, 19.0402, "Hungary", "Europe"),
        loc("warsaw", "Warsaw, Poland", 52.2297, 21.0122, "Poland", "Europe"),
        loc("moscow", "Moscow, Russia", 55.7558, 37.6173, "Russia", "Europe"),
        loc("istanbul", "Istanbul, Turkey", 41.0082, 28.9784, "Turkey", "Europe"),
        loc("new_york", "New York, USA", 40.7128, -74.006, "USA", "North America"),
        loc("los_angeles", "Los Angeles, USA", 34.0522, -118.2437, "USA", "North America"),
        loc("chicago", "Chicago, USA", 41.8781, -87.6298, "USA", "North America"),
        loc("houston", "Houston, USA", 29.7604, -95.3698, "USA", "North America"),
        loc("miami", "Miami, USA", 25.7617, -80.1918, "USA", "North America"),
        loc("toronto", "Toronto, Canada", 43.6532, -79.3832, "Canada", "North America"),
        loc("vancouver", "Vancouver, Canada", 49.2827, -123.1207, "Canada", "North America"),
        loc("mexico_city", "Mexico City, Mexico", 19.4326, -99.1332, "Mexico", "North America"),
        loc("havana", "Havana, Cuba", 23.1136, -82.3666, "Cuba", "North America"),
        loc("sao_paulo", "Sao Paulo, Brazil", -23.5505, -46.6333, "Brazil", "South America"),
        loc("rio", "Rio de Janeiro, Brazil", -22.9068, -43.1729, "Brazil", "South America"),
        loc("buenos_aires", "Buenos Aires, Argentina", -34.6037, -58.3816, "Argentina", "South America"),
        loc("lima", "Lima, Peru", -12.0464, -77.0428, "Peru", "South America"),
        loc("bogota", "Bogota, Colombia", 4.711, -74.0721, "Colombia", "South America"),
        loc("santiago", "Santiago, Chile", -33.4489, -70.6693, "Chile", "South America"),
        loc("caracas", "Caracas, Venezuela", 10.4806, -66.9036, "Venezuela", "South America"),
        loc("cairo", "Cairo, Egypt", 30.0444, 31.2357, "Egypt", "Africa"),
        loc("nairobi", "Nairobi, Kenya", -1.2921, 36.8219, "Kenya", "Africa"),
        loc("johannesburg", "Johannesburg, South Africa", -26.2041, 28.0473, "South Africa", "Africa"),
        loc("cape_town", "Cape Town, South Africa", -33.9249, 18.4241, "South Africa", "Africa"),
        loc("lagos", "Lagos, Nigeria", 6.5244, 3.3792, "Nigeria", "Africa"),
        loc("accra", "Accra, Ghana", 5.6037, -0.187, "Ghana", "Africa"),
        loc("dar_es_salaam", "Dar es Salaam, Tanzania", -6.7924, 39.2083, "Tanzania", "Africa"),
        loc("casablanca", "Casablanca, Morocco", 33.5731, -7.5898, "Morocco", "Africa"),
        loc("sydney", "Sydney, Australia", -33.8688, 151.2093, "Australia", "Oceania"),
        loc("melbourne", "Melbourne, Australia", -37.8136, 144.9631, "Australia", "Oceania"),
        loc("perth", "Perth, Australia", -31.9505, 115.8605, "Australia", "Oceania"),
        loc("auckland", "Auckland, New Zealand", -36.8509, 174.7645, "New Zealand", "Oceania"),
        loc("wellington", "Wellington, New Zealand", -41.2865, 174.7762, "New Zealand", "Oceania"),
        loc("suva", "Suva, Fiji", -18.1248, 178.4501, "Fiji", "Oceania"),
        loc("dubai", "Dubai, UAE", 25.2048, 55.2708, "UAE", "Asia"),
        loc("abu_dhabi", "Abu Dhabi, UAE", 24.4539, 54.3773, "UAE", "Asia"),
        loc("riyadh", "Riyadh, Saudi Arabia", 24.7136, 46.6753, "Saudi Arabia", "Asia"),
        loc("doha", "Doha, Qatar", 25.2854, 51.531, "Qatar", "Asia"),
        loc("kuwait_city", "Kuwait City, Kuwait", 29.3759, 47.9774, "Kuwait", "Asia"),
        loc("muscat", "Muscat, Oman", 23.588, 58.3829, "Oman", "Asia"),
    ];

    static ref BY_ID: HashMap<&'static str, &'static Location> =
        LOCATIONS.iter().map(|l| (l.id.as_str(), l)).collect();
}

/// All locations in display order.
pub fn all() -> &'static [Location] {
    &LOCATIONS
}

/// Look up a location by id.
pub fn lookup(id: &str) -> Option<&'static Location> {
    BY_ID.get(id).copied()
}

/// Look up a location, falling back to a placeholder at 0/0.
pub fn resolve(id: &str) -> Location {
    lookup(id).cloned().unwrap_or_else(|| Location::unknown(id))
}

/// Locations grouped by continent, each group in display order.
pub fn by_continent() -> BTreeMap<&'static str, Vec<&'static Location>> {
    let mut continents: BTreeMap<&'static str, Vec<&'static Location>> = BTreeMap::new();
    for location in LOCATIONS.iter() {
        continents
            .entry(location.continent.as_str())
            .or_default()
            .push(location);
    }
    continents
}

/// The quick-access shortcuts, in order.
pub fn quick_access() -> Vec<&'static Location> {
    QUICK_ACCESS.iter().filter_map(|id| lookup(id)).collect()
}

/// Locations in a country (exact, case-insensitive match).
pub fn by_country(country: &str) -> Vec<&'static Location> {
    LOCATIONS
        .iter()
        .filter(|l| l.country.eq_ignore_ascii_case(country))
        .collect()
}
