//! Agent permission scopes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permissions an agent token can grant to the dashboard.
///
/// Tokens carry scopes as plain strings. Strings outside this enumeration are
/// tolerated on the wire but grant nothing: consumers check membership against
/// [`AgentScope::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentScope {
    #[serde(rename = "read:identity")]
    ReadIdentity,
    #[serde(rename = "read:skills")]
    ReadSkills,
    #[serde(rename = "read:wallet")]
    ReadWallet,
}

impl AgentScope {
    /// Every scope, in declaration order.
    pub fn all() -> [AgentScope; 3] {
        [
            AgentScope::ReadIdentity,
            AgentScope::ReadSkills,
            AgentScope::ReadWallet,
        ]
    }

    /// Wire representation of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentScope::ReadIdentity => "read:identity",
            AgentScope::ReadSkills => "read:skills",
            AgentScope::ReadWallet => "read:wallet",
        }
    }

    /// Parse a wire scope string. Unknown strings yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|scope| scope.as_str() == s)
    }

    /// The default scope list for newly issued tokens, as wire strings.
    pub fn default_scope() -> Vec<String> {
        Self::all().iter().map(|s| s.as_str().to_string()).collect()
    }
}

impl fmt::Display for AgentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
