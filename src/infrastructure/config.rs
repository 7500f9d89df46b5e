use crate::application::session::DemoCredentials;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_notification_limit")]
    pub notification_limit: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            notification_limit: default_notification_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Poll periods in seconds, one per dashboard resource.
#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_machines_secs")]
    pub machines_secs: u64,
    #[serde(default = "default_alerts_secs")]
    pub alerts_secs: u64,
    #[serde(default = "default_notifications_secs")]
    pub notifications_secs: u64,
    #[serde(default = "default_kpis_secs")]
    pub kpis_secs: u64,
    #[serde(default = "default_realtime_secs")]
    pub realtime_secs: u64,
    #[serde(default = "default_analytics_secs")]
    pub analytics_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            machines_secs: default_machines_secs(),
            alerts_secs: default_alerts_secs(),
            notifications_secs: default_notifications_secs(),
            kpis_secs: default_kpis_secs(),
            realtime_secs: default_realtime_secs(),
            analytics_secs: default_analytics_secs(),
        }
    }
}

impl PollingSettings {
    /// Convert a configured period, never below one second.
    pub fn period(secs: u64) -> Duration {
        Duration::from_secs(secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    #[serde(default = "default_demo_email")]
    pub email: String,
    #[serde(default = "default_demo_password")]
    pub password: String,
    #[serde(default = "default_demo_name")]
    pub name: String,
    pub session_file: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            email: default_demo_email(),
            password: default_demo_password(),
            name: default_demo_name(),
            session_file: None,
        }
    }
}

impl AuthSettings {
    pub fn credentials(&self) -> DemoCredentials {
        DemoCredentials {
            email: self.email.clone(),
            password: self.password.clone(),
            name: self.name.clone(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_notification_limit() -> usize {
    10
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_demo_email() -> String {
    "admin@ai4bmi.com".to_string()
}

fn default_demo_password() -> String {
    "Admin2026!".to_string()
}

fn default_demo_name() -> String {
    "Admin BMI".to_string()
}

fn default_machines_secs() -> u64 {
    5
}

fn default_alerts_secs() -> u64 {
    15
}

fn default_notifications_secs() -> u64 {
    30
}

fn default_kpis_secs() -> u64 {
    5
}

fn default_realtime_secs() -> u64 {
    3
}

fn default_analytics_secs() -> u64 {
    30
}

/// Load `config/factory.{toml,yaml,json}` if present, then `BMI_`-prefixed
/// environment overrides such as `BMI_API__BASE_URL`.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/factory").required(false))
        .add_source(
            config::Environment::with_prefix("BMI")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
