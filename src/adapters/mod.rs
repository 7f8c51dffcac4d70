// Adapters layer: concrete implementations for external systems (geocoding provider, http server).

pub mod geoapify;
pub mod http;
