//! Configuration loaded from the environment (and `.env` when present).

use std::env;
use std::str::FromStr;

/// Which metadata source backs the resolver. Chosen once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolverStrategy {
    /// Third-party aggregation API
    Aggregator,
    /// Embedded JSON in the platform's own pages
    Scrape,
}

impl FromStr for ResolverStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "aggregator" => Ok(ResolverStrategy::Aggregator),
            "scrape" | "page" => Ok(ResolverStrategy::Scrape),
            other => Err(format!("unknown resolver strategy: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    pub strategy: ResolverStrategy,
    /// Aggregation API endpoint queried with `?url=`
    pub aggregator_endpoint: String,
    /// Origin prefixed onto relative media paths from the aggregator
    pub aggregator_host: String,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let strategy = match lookup("RESOLVER_STRATEGY") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to the aggregator API", e);
                ResolverStrategy::Aggregator
            }),
            None => ResolverStrategy::Aggregator,
        };

        Self {
            addr: lookup("ADDR").unwrap_or_else(|| String::from("127.0.0.1")),
            port: lookup("PORT").unwrap_or_else(|| String::from("8000")),
            strategy,
            aggregator_endpoint: lookup("AGGREGATOR_ENDPOINT")
                .unwrap_or_else(|| String::from("https://www.tikwm.com/api/")),
            aggregator_host: lookup("AGGREGATOR_HOST")
                .unwrap_or_else(|| String::from("https://www.tikwm.com")),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}
