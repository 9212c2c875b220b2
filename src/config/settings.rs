use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Check token signatures before trusting claims. Disabling this reads
    /// the payload of any well-formed token as-is.
    #[serde(default = "default_verify_signature")]
    pub verify_signature: bool,
    /// Shared HS256 secret
    pub secret: Option<String>,
    /// RS256 key set location (e.g. a Cognito user pool's jwks.json)
    pub jwks_url: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub deployment: String,
    #[serde(default = "default_completion_api_version")]
    pub api_version: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub index_name: String,
    #[serde(default = "default_search_api_version")]
    pub api_version: String,
    /// Number of documents retrieved per query
    #[serde(default = "default_top")]
    pub top: u32,
    /// Index field holding the document text
    #[serde(default = "default_content_field")]
    pub content_field: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_verify_signature() -> bool {
    true
}

fn default_leeway() -> u64 {
    60
}

fn default_completion_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_search_api_version() -> String {
    "2023-11-01".to_string()
}

fn default_top() -> u32 {
    3
}

fn default_content_field() -> String {
    "content".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // GATEWAY_SERVER__PORT, GATEWAY_AUTH__JWKS_URL, ...
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            // Variable names used by existing deployments
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("completion.endpoint", env::var("AZURE_OPENAI_ENDPOINT").ok())?
            .set_override_option("completion.api_key", env::var("AZURE_OPENAI_API_KEY").ok())?
            .set_override_option(
                "completion.deployment",
                env::var("AZURE_OPENAI_DEPLOYMENT_GPT").ok(),
            )?
            .set_override_option("search.endpoint", env::var("AZURE_SEARCH_ENDPOINT").ok())?
            .set_override_option("search.api_key", env::var("AZURE_SEARCH_API_KEY").ok())?
            .set_override_option("search.index_name", env::var("AZURE_SEARCH_INDEX_NAME").ok())?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.verify_signature && self.auth.secret.is_none() && self.auth.jwks_url.is_none() {
            return Err(ConfigError::Message(
                "auth.secret or auth.jwks_url is required when auth.verify_signature is enabled"
                    .to_string(),
            ));
        }

        if self.search.enabled
            && (self.search.endpoint.is_empty()
                || self.search.api_key.is_empty()
                || self.search.index_name.is_empty())
        {
            return Err(ConfigError::Message(
                "search.endpoint, search.api_key and search.index_name must be set when search is enabled"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Settings view without credentials, safe to return to administrators
    pub fn public_view(&self) -> PublicSettings {
        PublicSettings {
            verify_signature: self.auth.verify_signature,
            key_source: if self.auth.jwks_url.is_some() {
                "jwks"
            } else if self.auth.secret.is_some() {
                "shared_secret"
            } else {
                "none"
            },
            issuer: self.auth.issuer.clone(),
            audience: self.auth.audience.clone(),
            completion_deployment: self.completion.deployment.clone(),
            completion_api_version: self.completion.api_version.clone(),
            search_enabled: self.search.enabled,
            search_index: self.search.index_name.clone(),
            search_top: self.search.top,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSettings {
    pub verify_signature: bool,
    pub key_source: &'static str,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub completion_deployment: String,
    pub completion_api_version: String,
    pub search_enabled: bool,
    pub search_index: String,
    pub search_top: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verify_signature: default_verify_signature(),
            secret: None,
            jwks_url: None,
            issuer: None,
            audience: None,
            leeway_seconds: default_leeway(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: String::new(),
            api_version: default_completion_api_version(),
            system_prompt: default_system_prompt(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key: String::new(),
            index_name: String::new(),
            api_version: default_search_api_version(),
            top: default_top(),
            content_field: default_content_field(),
        }
    }
}
