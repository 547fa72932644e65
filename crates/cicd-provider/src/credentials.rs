use std::fmt;

use secrecy::SecretString;

use crate::registry::RegistryError;

pub const DOCKER_USER_ENV: &str = "DOCKER_USER";
pub const DOCKER_PASSWORD_ENV: &str = "DOCKER_PASSWORD";

/// Docker Hub login credentials.
///
/// The password is wrapped in [`SecretString`] so it cannot end up in
/// `Debug` output or log lines.
pub struct DockerCredentials {
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for DockerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockerCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl DockerCredentials {
    /// Read `DOCKER_USER` and `DOCKER_PASSWORD` from the process environment.
    pub fn from_env() -> Result<Self, RegistryError> {
        Self::from_lookup(|key| {
            std::env::var(key)
                // arch-lint: allow(no-silent-result-drop) reason="an unset or non-unicode variable is reported as missing credentials below"
                .ok()
        })
    }

    /// Resolve credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RegistryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = required(&lookup, DOCKER_USER_ENV)?;
        let password = required(&lookup, DOCKER_PASSWORD_ENV)?;
        Ok(Self {
            username,
            password: SecretString::from(password),
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, RegistryError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RegistryError::MissingEnvVar(key.to_owned()))
}
