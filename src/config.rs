//! Agent configuration.
//!
//! Agents are configured with a string of space-separated `key=value` tokens,
//! e.g. `"alpha=0.05 load=weights.bin save=weights.bin"`. The string is parsed
//! once into an [`AgentConfig`]; unknown keys and malformed values are errors.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::constants::DEFAULT_ALPHA;

/// Typed agent configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub role: String,
    /// File to read initial weights from.
    pub load: Option<PathBuf>,
    /// File to write weights to at the end of a run.
    pub save: Option<PathBuf>,
    /// TD learning rate.
    pub alpha: f32,
    /// RNG seed for randomized agents.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            role: "unknown".to_string(),
            load: None,
            save: None,
            alpha: DEFAULT_ALPHA,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Parse `args` on top of the given name and role. Later tokens override
    /// earlier ones, so `args` may rename the agent.
    pub fn parse_with(name: &str, role: &str, args: &str) -> Result<Self> {
        let mut config = Self {
            name: name.to_string(),
            role: role.to_string(),
            ..Self::default()
        };
        for token in args.split_whitespace() {
            config.apply(token)?;
        }
        Ok(config)
    }

    /// Apply a single `key=value` token.
    pub fn apply(&mut self, token: &str) -> Result<()> {
        let Some((key, value)) = token.split_once('=') else {
            bail!("expected key=value, got {token:?}");
        };
        match key {
            "name" => self.name = value.to_string(),
            "role" => self.role = value.to_string(),
            "load" => self.load = Some(PathBuf::from(value)),
            "save" => self.save = Some(PathBuf::from(value)),
            "alpha" => self.alpha = parse_number(key, value)?,
            "seed" => self.seed = Some(parse_number(key, value)?),
            _ => bail!("unknown agent option {key:?}"),
        }
        Ok(())
    }
}

impl FromStr for AgentConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_with("unknown", "unknown", s)
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value for {key}: {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c: AgentConfig = "".parse().unwrap();
        assert_eq!(c, AgentConfig::default());
        assert_eq!(c.alpha, 0.1);
    }

    #[test]
    fn test_parse_all_keys() {
        let c = AgentConfig::parse_with(
            "tdl",
            "player",
            "alpha=0.025 load=in.bin save=out.bin seed=42",
        )
        .unwrap();
        assert_eq!(c.name, "tdl");
        assert_eq!(c.role, "player");
        assert_eq!(c.alpha, 0.025);
        assert_eq!(c.load, Some(PathBuf::from("in.bin")));
        assert_eq!(c.save, Some(PathBuf::from("out.bin")));
        assert_eq!(c.seed, Some(42));
    }

    #[test]
    fn test_later_tokens_override() {
        let c = AgentConfig::parse_with("tdl", "player", "name=mine alpha=1 alpha=0.5").unwrap();
        assert_eq!(c.name, "mine");
        assert_eq!(c.alpha, 0.5);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!("alpha".parse::<AgentConfig>().is_err());
        assert!("alpha=fast".parse::<AgentConfig>().is_err());
        assert!("seed=-1".parse::<AgentConfig>().is_err());
        assert!("depth=3".parse::<AgentConfig>().is_err());
    }
}
