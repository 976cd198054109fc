use std::env;

/// Shell configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tracing filter directive (e.g. "warn", "cellgraph_core=debug")
    pub log_filter: String,
    /// Print a prompt before reading each command
    pub prompt: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            prompt: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let log_filter = lookup("CELLGRAPH_LOG").unwrap_or_else(|| "warn".to_string());
        let prompt = match lookup("CELLGRAPH_PROMPT") {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| anyhow::anyhow!("CELLGRAPH_PROMPT: expected a boolean, got {value:?}"))?,
            None => false,
        };

        Ok(Self { log_filter, prompt })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[("CELLGRAPH_LOG", "debug"), ("CELLGRAPH_PROMPT", "Yes")]).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert!(config.prompt);
    }

    #[test]
    fn test_bad_flag() {
        assert!(config_from(&[("CELLGRAPH_PROMPT", "maybe")]).is_err());
    }
}
