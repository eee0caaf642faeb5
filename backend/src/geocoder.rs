use std::{future::Future, num::NonZeroUsize, sync::Mutex, time::Duration};

use lru::LruCache;
use serde::Deserialize;

use crate::models::{Coordinate, Place};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const SEARCH_LIMIT: &str = "5";
const USER_AGENT: &str = concat!("running_loops/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("address query is empty")]
    EmptyQuery,
    #[error("geocoding request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Request(err.without_url())
    }
}

/// Resolves free-text addresses into candidate start points.
pub trait Geocoder: Send + Sync {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Place>, GeocodeError>> + Send;
}

#[derive(Debug, Clone)]
pub struct NominatimClientParams {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_size: usize,
}

/// Nominatim search client with an in-memory LRU of recent queries.
pub struct NominatimClient {
    params: NominatimClientParams,
    client: reqwest::Client,
    cache: Mutex<LruCache<String, Vec<Place>>>,
}

#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimClient {
    pub fn new(params: NominatimClientParams) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(params.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let capacity = NonZeroUsize::new(params.cache_size).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            params,
            client,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    fn cached(&self, key: &str) -> Option<Vec<Place>> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    fn remember(&self, key: String, places: &[Place]) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, places.to_vec());
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let url = format!("{}/search", self.params.base_url.trim_end_matches('/'));
        let results: Vec<NominatimPlace> = self
            .client
            .get(url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", SEARCH_LIMIT)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_places(results))
    }
}

impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let key = normalize_query(query);
        if key.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        if let Some(places) = self.cached(&key) {
            tracing::debug!("Geocode cache hit for {key:?}");
            return Ok(places);
        }

        let places = self.fetch(query.trim()).await?;
        tracing::debug!("Geocoded {key:?} to {} place(s)", places.len());
        self.remember(key, &places);
        Ok(places)
    }
}

fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn parse_places(results: Vec<NominatimPlace>) -> Vec<Place> {
    results
        .into_iter()
        .filter_map(|place| {
            let lat = place.lat.parse::<f64>().ok();
            let lon = place.lon.parse::<f64>().ok();
            match (lat, lon) {
                (Some(lat), Some(lon)) if Coordinate::new(lat, lon).is_valid() => Some(Place {
                    label: place.display_name,
                    location: Coordinate::new(lat, lon),
                }),
                _ => {
                    tracing::warn!(
                        "Skipping geocoder result {:?} with invalid coordinate ({}, {})",
                        place.display_name,
                        place.lat,
                        place.lon
                    );
                    None
                }
            }
        })
        .collect()
}
