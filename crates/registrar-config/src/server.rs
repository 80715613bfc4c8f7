use crate::{env_lookup, parse_or};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    /// Enables the Prometheus recorder and the metrics listener.
    pub observability_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let observability_enabled = lookup("OBSERVABILITY_ENABLED")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "SERVER_PORT", 3000),
            metrics_port: parse_or(&lookup, "METRICS_PORT", 9090),
            observability_enabled,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn metrics_addr(&self) -> String {
        format!("{}:{}", self.host, self.metrics_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_lookup;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(map_lookup(&[]));
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.metrics_addr(), "0.0.0.0:9090");
        assert!(!config.observability_enabled);
    }

    #[test]
    fn test_observability_flag_values() {
        for value in ["true", "TRUE", "1", "yes"] {
            let config = ServerConfig::from_lookup(map_lookup(&[("OBSERVABILITY_ENABLED", value)]));
            assert!(config.observability_enabled, "{value} should enable");
        }
        let config = ServerConfig::from_lookup(map_lookup(&[("OBSERVABILITY_ENABLED", "off")]));
        assert!(!config.observability_enabled);
    }
}
