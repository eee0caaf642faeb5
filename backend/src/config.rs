use std::{net::SocketAddr, time::Duration};

use clap::Parser;

use crate::directions::{DEFAULT_DIRECTIONS_URL, DirectionsClientParams};
use crate::geocoder::{DEFAULT_GEOCODER_URL, NominatimClientParams};

/// Loop planner HTTP service. Every flag can also be set through its environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "running_loops", version)]
pub struct ServerConfig {
    /// Address the HTTP API listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Base URL of the Google-Directions-compatible routing service
    #[arg(long, env = "DIRECTIONS_URL", default_value = DEFAULT_DIRECTIONS_URL)]
    pub directions_url: String,

    /// API key appended to directions requests
    #[arg(long, env = "DIRECTIONS_API_KEY", hide_env_values = true)]
    pub directions_api_key: Option<String>,

    /// Timeout of a single routing request, in seconds
    #[arg(long, env = "ROUTING_TIMEOUT_SECS", default_value_t = 10)]
    pub routing_timeout_secs: u64,

    /// Base URL of the Nominatim geocoder
    #[arg(long, env = "GEOCODER_URL", default_value = DEFAULT_GEOCODER_URL)]
    pub geocoder_url: String,

    /// Number of address lookups kept in memory
    #[arg(long, env = "GEOCODER_CACHE_SIZE", default_value_t = 256)]
    pub geocoder_cache_size: usize,

    /// Fixed seed for waypoint jitter (reproducible loops)
    #[arg(long, env = "LOOP_SEED")]
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn directions_params(&self) -> DirectionsClientParams {
        DirectionsClientParams {
            base_url: self.directions_url.clone(),
            api_key: self.directions_api_key.clone(),
            timeout: Duration::from_secs(self.routing_timeout_secs),
        }
    }

    pub fn geocoder_params(&self) -> NominatimClientParams {
        NominatimClientParams {
            base_url: self.geocoder_url.clone(),
            timeout: Duration::from_secs(self.routing_timeout_secs),
            cache_size: self.geocoder_cache_size,
        }
    }
}
