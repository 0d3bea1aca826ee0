//! Backend configuration.
use config::{Config, Environment};
use rhi::{Error, Result};

/// Runtime options of the OpenGL backend.
///
/// Read from a `config::Config` under the keys below, or from the environment with the `RHI`
/// prefix (`RHI_USE_EXTERNAL_CONTEXT=1`, `RHI_RESTORE_STATE=true`...).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BackendConfig {
    /// The caller owns the context and has made it current. The backend never makes it current
    /// or presents through it.
    pub use_external_context: bool,
    /// Install the native debug output callback (needs `GL_KHR_debug` or `GL_ARB_debug_output`).
    pub debug_output: bool,
    /// Put previous native bindings back after bind-path operations.
    pub restore_state: bool,
}

impl Default for BackendConfig {
    fn default() -> BackendConfig {
        BackendConfig {
            use_external_context: false,
            debug_output: cfg!(debug_assertions),
            restore_state: cfg!(feature = "restore-state"),
        }
    }
}

fn get_bool(cfg: &Config, key: &str, default: bool) -> Result<bool> {
    match cfg.get::<bool>(key) {
        Ok(v) => Ok(v),
        Err(config::ConfigError::NotFound(_)) => Ok(default),
        Err(e) => Err(Error::Config(format!("{}: {}", key, e))),
    }
}

impl BackendConfig {
    pub fn from_config(cfg: &Config) -> Result<BackendConfig> {
        let d = BackendConfig::default();
        Ok(BackendConfig {
            use_external_context: get_bool(cfg, "use_external_context", d.use_external_context)?,
            debug_output: get_bool(cfg, "debug_output", d.debug_output)?,
            restore_state: get_bool(cfg, "restore_state", d.restore_state)?,
        })
    }

    pub fn from_env() -> Result<BackendConfig> {
        let cfg = Config::builder()
            .add_source(Environment::with_prefix("RHI"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;
        BackendConfig::from_config(&cfg)
    }
}
