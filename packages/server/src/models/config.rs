use std::env;
use std::fs;
use std::path::Path;

use super::role::Role;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read role file {path}: {source}")]
    RoleFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("role file contains no roles")]
    EmptyRolePool,
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// The configured multiset of roles. Its size is the number of players a game
/// needs, and it is never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePool {
    roles: Vec<Role>,
}

impl RolePool {
    pub fn new(roles: Vec<Role>) -> Result<Self, ConfigError> {
        if roles.is_empty() {
            return Err(ConfigError::EmptyRolePool);
        }
        Ok(Self { roles })
    }

    /// One role per line. The whole text is trimmed first, then each line loses
    /// its trailing carriage returns.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyRolePool);
        }
        let roles = trimmed
            .split('\n')
            .map(|line| Role::from(line.trim_end_matches('\r').to_string()))
            .collect();
        Self::new(roles)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::RoleFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn required_players(&self) -> usize {
        self.roles.len()
    }
}

/// Which living players a day vote has to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayQuorum {
    /// Every living player, connected or not.
    AllAlive,
    /// Only living players that are currently connected.
    ConnectedAlive,
}

impl std::str::FromStr for DayQuorum {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_alive" => Ok(DayQuorum::AllAlive),
            "connected_alive" => Ok(DayQuorum::ConnectedAlive),
            other => Err(ConfigError::InvalidValue {
                key: "DAY_QUORUM",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleConfig {
    // 結果ブロードキャストに役職を含めるかどうか
    pub reveal_roles_in_roster: bool,
    pub day_quorum: DayQuorum,
    // 騎士が二晩続けて同じ相手を護衛できないようにするか
    pub forbid_repeat_protection: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            reveal_roles_in_roster: true,
            day_quorum: DayQuorum::AllAlive,
            forbid_repeat_protection: false,
        }
    }
}

impl RuleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let reveal_roles_in_roster = env::var("REVEAL_ROLES_IN_ROSTER")
            .map(|v| v == "true")
            .unwrap_or(defaults.reveal_roles_in_roster);
        let day_quorum = match env::var("DAY_QUORUM") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.day_quorum,
        };
        let forbid_repeat_protection = env::var("FORBID_REPEAT_PROTECTION")
            .map(|v| v == "true")
            .unwrap_or(defaults.forbid_repeat_protection);

        Ok(Self {
            reveal_roles_in_roster,
            day_quorum,
            forbid_repeat_protection,
        })
    }
}
