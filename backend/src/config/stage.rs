use std::fmt;

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Local,
    Development,
    Production,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Stage::Local => "local",
            Stage::Development => "development",
            Stage::Production => "production",
        };
        write!(f, "{}", stage)
    }
}

impl TryFrom<&String> for Stage {
    type Error = anyhow::Error;

    fn try_from(stage: &String) -> Result<Self> {
        match stage.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Stage::Local),
            "development" | "dev" => Ok(Stage::Development),
            "production" | "prod" => Ok(Stage::Production),
            other => bail!("unknown stage: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_stages() {
        assert_eq!(Stage::try_from(&"PROD".to_string()).unwrap(), Stage::Production);
        assert_eq!(Stage::try_from(&"dev".to_string()).unwrap(), Stage::Development);
        assert_eq!(Stage::try_from(&"local".to_string()).unwrap(), Stage::Local);
    }

    #[test]
    fn unknown_stage_falls_back_to_default() {
        let stage = Stage::try_from(&"staging-ish".to_string()).unwrap_or_default();
        assert_eq!(stage, Stage::Local);
    }
}
