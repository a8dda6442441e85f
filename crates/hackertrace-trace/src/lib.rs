//! Trace pathway: city catalog, synthetic traceroute generation, the
//! optional real-trace feed with synthetic fallback, great-circle path
//! interpolation, and trace progress.

pub mod cities;
pub mod feed;
pub mod generator;
pub mod geo;
pub mod progress;

pub use cities::{CITIES, City, city, city_names, normalize_city, resolve_city};
pub use feed::{HttpTraceFeed, TraceFeed, resolve_hops};
pub use generator::{Hop, generate_hops, generate_traceroute};
pub use geo::{LonLat, distance_km, great_circle_path, great_circle_point};
pub use progress::TraceProgress;
