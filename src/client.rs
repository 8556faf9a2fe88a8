//! Blocking client for the job-market data service.
//!
//! One GET per view, no retries and no caching: the service is a stateless
//! read-only oracle and every call fetches fresh data. Filters travel as
//! query parameters; the response body is handed back as untyped JSON for
//! the normalizer.
use crate::config::ServiceConfig;
use crate::errors::{ReportError, Result};
use crate::types::{ViewKind, ViewOptions};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Path and query parameters for one view request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn for_view(kind: ViewKind, options: &ViewOptions) -> Self {
        let location = options.location_filter.clone();
        let (path, query) = match kind {
            // Counts always carry a location; empty means every location.
            ViewKind::JobCounts => (
                "/job_listings/counts",
                vec![("location", location.unwrap_or_default())],
            ),
            ViewKind::Skills => {
                let mut query = Vec::new();
                if let Some(role) = options.role_filter.clone().filter(|r| !r.is_empty()) {
                    query.push(("role", role));
                }
                query.push(("top_k", options.top_k.to_string()));
                ("/skills/top", query)
            }
            ViewKind::WorkStyle => ("/remote_v_onsite", Vec::new()),
            ViewKind::Geography => ("/geographic_distribution", optional_location(location)),
            ViewKind::Salaries => ("/salaries", optional_location(location)),
            ViewKind::Listings => ("/recent_listings", optional_location(location)),
        };
        Self { path, query }
    }
}

fn optional_location(location: Option<String>) -> Vec<(&'static str, String)> {
    location
        .filter(|l| !l.is_empty())
        .map(|l| vec![("location", l)])
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct DataServiceClient {
    base_url: String,
    timeout: Duration,
}

impl DataServiceClient {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path)
    }

    /// Fetch the raw payload for a view.
    pub fn fetch(&self, kind: ViewKind, options: &ViewOptions) -> Result<Value> {
        let endpoint = Endpoint::for_view(kind, options);
        let url = self.url(&endpoint);
        let mut request = ureq::get(&url).timeout(self.timeout);
        for (name, value) in &endpoint.query {
            request = request.query(name, value);
        }
        info!(view = %kind, %url, "fetching payload");

        match request.call() {
            Ok(resp) => {
                let payload: Value = resp.into_json()?;
                debug!(view = %kind, "payload decoded");
                Ok(payload)
            }
            Err(ureq::Error::Status(status, resp)) => {
                let detail = resp
                    .into_json::<Value>()
                    .ok()
                    .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string))
                    .unwrap_or_else(|| "An error occurred while fetching data".to_string());
                Err(ReportError::Http {
                    url,
                    status,
                    detail,
                })
            }
            Err(ureq::Error::Transport(t)) => Err(ReportError::Transport {
                url,
                reason: t.to_string(),
            }),
        }
    }
}
