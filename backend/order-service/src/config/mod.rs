use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Service configuration
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_service_name() -> String {
    "order-service".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
