use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Lifetime of a bound session key handle.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Cadence of the expired-handle sweeper.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_otp_ttl_secs")]
    pub otp_ttl_secs: u64,

    /// Require a second-factor OTP after password login.
    #[serde(default)]
    pub otp_on_login: bool,

    #[serde(default = "default_max_failed_logins")]
    pub max_failed_logins: u32,

    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            otp_ttl_secs: default_otp_ttl_secs(),
            otp_on_login: false,
            max_failed_logins: default_max_failed_logins(),
            lockout_secs: default_lockout_secs(),
        }
    }
}

fn default_session_ttl_secs() -> u64 {
    1800
} // 30 minutes
fn default_sweep_interval_secs() -> u64 {
    60
}
fn default_otp_ttl_secs() -> u64 {
    300
} // 5 minutes
fn default_max_failed_logins() -> u32 {
    5
}
fn default_lockout_secs() -> u64 {
    900
} // 15 minutes

impl EngineConfig {
    pub fn load() -> EngineResult<Self> {
        Figment::new()
            .merge(Toml::file("docseal.toml"))
            .merge(Env::prefixed("DOCSEAL_"))
            .extract()
            .map_err(|e| EngineError::Config(e.to_string()))
    }
}
