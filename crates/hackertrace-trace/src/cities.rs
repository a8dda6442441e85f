//! Built-in city catalog and name resolution.

use hackertrace_types::error::{HackerError, Result};

/// A traceable destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    /// Lookup key (lowercase, letters only).
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// `[longitude, latitude]` in degrees.
    pub coordinates: [f64; 2],
}

pub const CITIES: &[City] = &[
    City {
        name: "delhi",
        label: "Delhi, India",
        coordinates: [77.2090, 28.6139],
    },
    City {
        name: "paris",
        label: "Paris, France",
        coordinates: [2.3522, 48.8566],
    },
    City {
        name: "tokyo",
        label: "Tokyo, Japan",
        coordinates: [139.6917, 35.6895],
    },
    City {
        name: "nyc",
        label: "New York City, USA",
        coordinates: [-74.0060, 40.7128],
    },
    City {
        name: "london",
        label: "London, UK",
        coordinates: [-0.1276, 51.5074],
    },
    City {
        name: "sydney",
        label: "Sydney, Australia",
        coordinates: [151.2093, -33.8688],
    },
];

const SYNONYMS: &[(&str, &str)] = &[
    ("newyork", "nyc"),
    ("ny", "nyc"),
    ("newyorkcity", "nyc"),
    ("ncr", "delhi"),
    ("syd", "sydney"),
];

/// Exact lookup by catalog key.
pub fn city(name: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.name == name)
}

/// Comma-separated catalog keys, in catalog order.
pub fn city_names() -> String {
    CITIES.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
}

/// Resolve free-form input ("New York", "SYD", "paris!") to a catalog city.
///
/// Input is lowercased and stripped to ASCII letters before lookup.
pub fn normalize_city(input: &str) -> Option<&'static City> {
    let key: String = input
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if key.is_empty() {
        return None;
    }
    city(&key).or_else(|| {
        SYNONYMS
            .iter()
            .find(|(alias, _)| *alias == key)
            .and_then(|(_, target)| city(target))
    })
}

/// Like [`normalize_city`], but reports unknown input as an error.
pub fn resolve_city(input: &str) -> Result<&'static City> {
    normalize_city(input).ok_or_else(|| HackerError::UnknownCity {
        input: input.to_string(),
        known: city_names(),
    })
}
