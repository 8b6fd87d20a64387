//! Configuration for blvm-script-core
//!
//! Script interpreter limits and signing behaviour. Settings can be built
//! programmatically, deserialized from a config file, or loaded from
//! environment variables.

use crate::constants::{MAX_SCRIPT_OPS, MAX_SCRIPT_SIZE, MAX_STACK_SIZE};
use crate::error::{ConsensusError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Script interpreter limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Maximum combined main + alt stack size (Bitcoin Core: 1000)
    #[serde(default = "default_max_stack_size")]
    pub max_stack_size: usize,

    /// Maximum non-push opcodes executed per evaluation (Bitcoin Core: 201)
    #[serde(default = "default_max_ops")]
    pub max_ops: usize,

    /// Maximum script length accepted by the parser (Bitcoin Core: 10000 bytes)
    #[serde(default = "default_max_script_size")]
    pub max_script_size: usize,

    /// Recognise the BIP16 pay-to-script-hash pattern during evaluation
    #[serde(default = "default_true")]
    pub enable_p2sh: bool,

    /// Log every executed opcode at trace level
    #[serde(default)]
    pub verbose_logging: bool,
}

fn default_max_stack_size() -> usize {
    MAX_STACK_SIZE
}

fn default_max_ops() -> usize {
    MAX_SCRIPT_OPS
}

fn default_max_script_size() -> usize {
    MAX_SCRIPT_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_stack_size: MAX_STACK_SIZE,
            max_ops: MAX_SCRIPT_OPS,
            max_script_size: MAX_SCRIPT_SIZE,
            enable_p2sh: true,
            verbose_logging: false,
        }
    }
}

/// How ECDSA signing picks its nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoncePolicy {
    /// Uniformly random k in [1, n-1] from the OS-seeded thread RNG
    #[default]
    Random,
    /// RFC 6979 HMAC-SHA256 derivation from the secret and message hash
    Deterministic,
}

impl FromStr for NoncePolicy {
    type Err = ConsensusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(NoncePolicy::Random),
            "deterministic" | "rfc6979" => Ok(NoncePolicy::Deterministic),
            other => Err(ConsensusError::Config(
                format!("unknown nonce policy '{other}'").into(),
            )),
        }
    }
}

/// Signing configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SigningConfig {
    #[serde(default)]
    pub nonce: NoncePolicy,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Script interpreter limits
    #[serde(default)]
    pub script: ScriptConfig,

    /// ECDSA signing behaviour
    #[serde(default)]
    pub signing: SigningConfig,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

impl CoreConfig {
    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `BLVM_<SECTION>_<KEY>`, e.g.
    /// `BLVM_SCRIPT_MAX_OPS=201` or `BLVM_SIGNING_NONCE=deterministic`.
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = env_parse("BLVM_SCRIPT_MAX_STACK_SIZE") {
            config.script.max_stack_size = size;
        }
        if let Some(ops) = env_parse("BLVM_SCRIPT_MAX_OPS") {
            config.script.max_ops = ops;
        }
        if let Some(size) = env_parse("BLVM_SCRIPT_MAX_SCRIPT_SIZE") {
            config.script.max_script_size = size;
        }
        if let Some(enabled) = env_parse("BLVM_SCRIPT_ENABLE_P2SH") {
            config.script.enable_p2sh = enabled;
        }
        if let Some(enabled) = env_parse("BLVM_SCRIPT_VERBOSE_LOGGING") {
            config.script.verbose_logging = enabled;
        }
        if let Some(policy) = env_parse("BLVM_SIGNING_NONCE") {
            config.signing.nonce = policy;
        }

        config
    }
}

/// Global configuration instance
static GLOBAL_CORE_CONFIG: std::sync::OnceLock<CoreConfig> = std::sync::OnceLock::new();

/// Initialize the global configuration.
///
/// Call once at startup, before any evaluation or signing. A second call fails.
pub fn init_core_config(config: CoreConfig) -> Result<()> {
    GLOBAL_CORE_CONFIG
        .set(config)
        .map_err(|_| ConsensusError::Config("core config already initialized".into()))
}

/// Get the global configuration, falling back to [`CoreConfig::from_env`].
pub fn get_core_config() -> CoreConfig {
    GLOBAL_CORE_CONFIG
        .get()
        .cloned()
        .unwrap_or_else(CoreConfig::from_env)
}
