use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A role from the configured pool. Names that carry no special behavior
/// (including "villager") are kept verbatim so the pool round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Werewolf,
    Bodyguard,
    Seer,
    Villager,
    Other(String),
}

impl Role {
    pub fn is_werewolf(&self) -> bool {
        matches!(self, Role::Werewolf)
    }

    /// Roles that must submit something before the night can resolve.
    pub fn acts_at_night(&self) -> bool {
        matches!(self, Role::Werewolf | Role::Bodyguard | Role::Seer)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Werewolf => "werewolf",
            Role::Bodyguard => "bodyguard",
            Role::Seer => "seer",
            Role::Villager => "villager",
            Role::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s.to_string()))
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.as_str() {
            "werewolf" => Role::Werewolf,
            "bodyguard" => Role::Bodyguard,
            "seer" => Role::Seer,
            "villager" => Role::Villager,
            _ => Role::Other(name),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}
