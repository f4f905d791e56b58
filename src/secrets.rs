use async_trait::async_trait;
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Secret parameter not found: {0}")]
    NotFound(String),
    #[error("Secret parameter is empty: {0}")]
    Empty(String),
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the decrypted value of a named parameter.
    async fn get_parameter(&self, name: &str) -> Result<String, SecretError>;
}

/// Resolves parameters from the process environment.
///
/// A parameter path such as `/owm/owmapikey` is read from `OWM_OWMAPIKEY`. The variable is
/// read again on every call, so rotating it takes effect without a restart.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    pub fn variable_name(parameter: &str) -> String {
        parameter
            .trim_start_matches('/')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_parameter(&self, name: &str) -> Result<String, SecretError> {
        let var = Self::variable_name(name);
        let value = env::var(&var).map_err(|_| SecretError::NotFound(name.to_string()))?;
        if value.trim().is_empty() {
            return Err(SecretError::Empty(name.to_string()));
        }
        tracing::debug!("Resolved secret parameter {} from {}", name, var);
        Ok(value)
    }
}
