//! Backend address resolution.
//!
//! The address is resolved once at startup: an explicit override wins,
//! then a GitHub Codespaces environment maps onto its forwarded backend
//! port (`<codespace>-8000.<domain>`), and everything else talks to the
//! local default.

use std::env;
use std::fmt;

use crate::utils::url::normalize_base_url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const ENDPOINT_ENV_VAR: &str = "JOKEBOX_ENDPOINT";

const BACKEND_PORT: u16 = 8000;
const FRONTEND_PORT: u16 = 5173;
const CODESPACES_DOMAIN: &str = "app.github.dev";

/// Where a resolved endpoint came from, for `status` output and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSource {
    Flag,
    Environment,
    Config,
    Codespaces,
    Default,
}

impl fmt::Display for EndpointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EndpointSource::Flag => "--endpoint",
            EndpointSource::Environment => ENDPOINT_ENV_VAR,
            EndpointSource::Config => "config file",
            EndpointSource::Codespaces => "Codespaces",
            EndpointSource::Default => "default",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub source: EndpointSource,
}

/// Inputs to resolution, gathered once so the decision itself stays pure.
#[derive(Debug, Default, Clone)]
pub struct EndpointInputs {
    pub flag: Option<String>,
    pub env_override: Option<String>,
    pub config: Option<String>,
    pub codespace_name: Option<String>,
    pub codespaces_domain: Option<String>,
}

impl EndpointInputs {
    pub fn from_env(flag: Option<String>, config: Option<String>) -> Self {
        Self {
            flag,
            env_override: env::var(ENDPOINT_ENV_VAR).ok(),
            config,
            codespace_name: env::var("CODESPACE_NAME").ok(),
            codespaces_domain: env::var("GITHUB_CODESPACES_PORT_FORWARDING_DOMAIN").ok(),
        }
    }
}

pub fn resolve_endpoint(inputs: &EndpointInputs) -> ResolvedEndpoint {
    let explicit = [
        (&inputs.flag, EndpointSource::Flag),
        (&inputs.env_override, EndpointSource::Environment),
        (&inputs.config, EndpointSource::Config),
    ];
    let domain = non_empty(&inputs.codespaces_domain).unwrap_or(CODESPACES_DOMAIN);
    for (value, source) in explicit {
        if let Some(url) = non_empty(value) {
            return ResolvedEndpoint {
                url: backend_for_forwarded_host(&normalize_base_url(url), domain),
                source,
            };
        }
    }

    if let Some(name) = non_empty(&inputs.codespace_name) {
        return ResolvedEndpoint {
            url: format!("https://{name}-{BACKEND_PORT}.{domain}"),
            source: EndpointSource::Codespaces,
        };
    }

    ResolvedEndpoint {
        url: DEFAULT_ENDPOINT.to_string(),
        source: EndpointSource::Default,
    }
}

/// Point a forwarded frontend address (`<name>-5173.<domain>`) at the
/// backend's forwarded port instead. Other addresses pass through.
pub fn backend_for_forwarded_host(url: &str, domain: &str) -> String {
    let frontend = format!("-{FRONTEND_PORT}.{domain}");
    match url.find(&frontend) {
        Some(index) => format!(
            "{}-{BACKEND_PORT}.{domain}{}",
            &url[..index],
            &url[index + frontend.len()..]
        ),
        None => url.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
