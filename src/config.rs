use std::env;

/// Runtime configuration for the 3scale admin API client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_url: String,
    pub access_token: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - THREESCALE_ADMIN_URL [required], e.g. https://acme-admin.3scale.net
    /// - THREESCALE_ACCESS_TOKEN [required]
    /// - THREESCALE_HTTP_TIMEOUT_SECS (default: 30)
    /// - THREESCALE_USER_AGENT (default: threescale-metrics/<version>)
    pub fn from_env() -> Result<Self, String> {
        let admin_url = env::var("THREESCALE_ADMIN_URL")
            .map_err(|_| "Missing THREESCALE_ADMIN_URL".to_string())?;
        url::Url::parse(&admin_url)
            .map_err(|e| format!("Invalid THREESCALE_ADMIN_URL '{}': {}", admin_url, e))?;
        let access_token = env::var("THREESCALE_ACCESS_TOKEN")
            .map_err(|_| "Missing THREESCALE_ACCESS_TOKEN".to_string())?;

        let timeout_secs = match env::var("THREESCALE_HTTP_TIMEOUT_SECS") {
            Ok(s) => s
                .parse::<u64>()
                .map_err(|_| format!("Invalid THREESCALE_HTTP_TIMEOUT_SECS '{}'", s))?,
            Err(_) => 30,
        };
        let user_agent = env::var("THREESCALE_USER_AGENT")
            .unwrap_or_else(|_| format!("threescale-metrics/{}", env!("CARGO_PKG_VERSION")));

        Ok(Self::new(admin_url, access_token)
            .with_timeout_secs(timeout_secs)
            .with_user_agent(user_agent))
    }

    pub fn new(admin_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            admin_url: admin_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            user_agent: format!("threescale-metrics/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
