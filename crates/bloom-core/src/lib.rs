//! Shared types for Bloom agent authentication.
//!
//! - [`config`]: YAML configuration with environment overrides
//! - [`scope`]: the permission enumeration carried by agent tokens
//! - [`identity`]: the identity profile embedded in agent tokens

pub mod config;
pub mod identity;
pub mod scope;

pub use config::{
    AuthConfig, BloomConfig, ConfigError, DashboardConfig, Network, WalletConfig, parse_duration,
};
pub use identity::{IdentityData, PersonalityType, ProfileMode};
pub use scope::AgentScope;
