use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Service configuration
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_environment")]
    pub environment: String,

    // Escalation threshold: warnings at or above this count trigger a ban
    #[serde(default = "default_warning_ban_threshold")]
    pub warning_ban_threshold: u32,
}

fn default_service_name() -> String {
    "trust-safety-service".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_warning_ban_threshold() -> u32 {
    3
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.service_name, "trust-safety-service");
        assert_eq!(config.warning_ban_threshold, 3);
    }
}
