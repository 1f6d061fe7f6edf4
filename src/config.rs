//! Bot configuration.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;
use crate::protocol::signer::SEED_LEN;

/// Time to wait between mention polls when nothing is configured.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Bot configuration: identity plus poll cadence. Collaborators (feed
/// source, resolver) are passed separately at construction.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Fid of the bot identity; mentions of this fid are polled.
    pub fid: u64,
    /// Hex-encoded 32-byte ed25519 signing seed. Never logged.
    pub signer_seed: SecretString,
    /// Interval between mention polls.
    pub cooldown: Duration,
}

impl BotConfig {
    /// Load the configuration from `POLLCAST_FID`, `POLLCAST_SIGNER_SEED`
    /// and optional `POLLCAST_COOLDOWN_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let fid = std::env::var("POLLCAST_FID")
            .map_err(|_| ConfigError::MissingEnvVar("POLLCAST_FID".into()))?
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "POLLCAST_FID".into(),
                message: e.to_string(),
            })?;
        let signer_seed = std::env::var("POLLCAST_SIGNER_SEED")
            .map_err(|_| ConfigError::MissingEnvVar("POLLCAST_SIGNER_SEED".into()))?;
        let cooldown = match std::env::var("POLLCAST_COOLDOWN_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: "POLLCAST_COOLDOWN_SECS".into(),
                    message: e.to_string(),
                }
            })?),
            Err(_) => DEFAULT_COOLDOWN,
        };
        Ok(Self {
            fid,
            signer_seed: SecretString::from(signer_seed),
            cooldown,
        })
    }

    /// Validate the identity fields. This is the fatal-at-startup check;
    /// nothing else in the pipeline refuses to run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fid == 0 {
            return Err(ConfigError::ZeroFid);
        }
        if self.signer_seed.expose_secret().is_empty() {
            return Err(ConfigError::MissingSeed);
        }
        Ok(())
    }

    /// Decode the hex signing seed, accepting an optional `0x` prefix.
    pub fn decode_seed(&self) -> Result<Vec<u8>, ConfigError> {
        let raw = self.signer_seed.expose_secret();
        let raw = raw.strip_prefix("0x").unwrap_or(raw);
        let seed = hex::decode(raw).map_err(|e| ConfigError::InvalidSeed(e.to_string()))?;
        if seed.len() != SEED_LEN {
            return Err(ConfigError::InvalidSeed(format!(
                "expected {SEED_LEN} bytes, got {}",
                seed.len()
            )));
        }
        Ok(seed)
    }
}
