use crate::model::PropertyImagery;
use std::sync::Arc;
use url::Url;

const STATIC_MAPS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";
const MAPS_SEARCH_ENDPOINT: &str = "https://www.google.com/maps/search/";

/// Keys shipped in sample `.env` files; treated as "no key".
const PLACEHOLDER_KEYS: [&str; 2] = ["your-google-maps-api-key", "YOUR_GOOGLE_MAPS_API_KEY"];

/// Decorates a report with map links for the property address.
/// Implementations only build URLs; they never fetch anything.
pub trait ImageryProvider: Send + Sync {
    fn imagery_for(&self, address: &str) -> Option<PropertyImagery>;
}

pub struct NoImagery;

impl ImageryProvider for NoImagery {
    fn imagery_for(&self, _address: &str) -> Option<PropertyImagery> {
        None
    }
}

/// Google Static Maps satellite tile plus a Maps search link.
#[derive(Debug, Clone)]
pub struct StaticMapsImagery {
    api_key: String,
    pub width: u32,
    pub height: u32,
    pub zoom: u8,
}

impl StaticMapsImagery {
    /// `None` for blank or placeholder keys.
    pub fn new(api_key: &str) -> Option<Self> {
        let key = api_key.trim();
        if key.is_empty() || PLACEHOLDER_KEYS.contains(&key) {
            return None;
        }
        Some(Self {
            api_key: key.to_string(),
            width: 800,
            height: 400,
            zoom: 18,
        })
    }

    pub fn satellite_url(&self, address: &str) -> Option<Url> {
        let zoom = self.zoom.to_string();
        let size = format!("{}x{}", self.width, self.height);
        Url::parse_with_params(
            STATIC_MAPS_ENDPOINT,
            &[
                ("center", address),
                ("zoom", zoom.as_str()),
                ("size", size.as_str()),
                ("maptype", "satellite"),
                ("key", self.api_key.as_str()),
            ],
        )
        .ok()
    }
}

impl ImageryProvider for StaticMapsImagery {
    fn imagery_for(&self, address: &str) -> Option<PropertyImagery> {
        Some(PropertyImagery {
            satellite_image_url: self.satellite_url(address)?.into(),
            maps_url: maps_search_url(address)?.into(),
        })
    }
}

pub fn maps_search_url(address: &str) -> Option<Url> {
    Url::parse_with_params(MAPS_SEARCH_ENDPOINT, &[("api", "1"), ("query", address)]).ok()
}

/// Static Maps when a usable key is configured, otherwise no imagery.
pub fn provider_for(api_key: Option<&str>) -> Arc<dyn ImageryProvider> {
    match api_key.and_then(StaticMapsImagery::new) {
        Some(p) => Arc::new(p),
        None => Arc::new(NoImagery),
    }
}
