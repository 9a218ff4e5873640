//! Application settings loaded via OrthoConfig.

use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::inbound::http::auth::BasicCredentials;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_USER: &str = "admin";
const DEFAULT_PASSWORD: &str = "password";

/// Deployment mode. Anything but [`Environment::Production`] exposes error
/// stacks and logs request context on failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    /// Local development.
    #[default]
    Development,
    /// Live deployment.
    Production,
    /// Automated test runs.
    Test,
}

impl Environment {
    /// Lower-case name reported by the health endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    /// Whether this is the production mode.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(SettingsError::UnknownEnvironment(s.to_owned())),
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The environment name is not one of the supported modes.
    #[error("unknown environment `{0}`; expected development, production or test")]
    UnknownEnvironment(String),
}

/// Runtime configuration for the API server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CARBON")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// TCP port to listen on.
    pub port: Option<u16>,
    /// Deployment mode name.
    pub environment: Option<String>,
    /// Username accepted by Basic authentication.
    pub basic_auth_user: Option<String>,
    /// Password accepted by Basic authentication.
    pub basic_auth_password: Option<String>,
}

impl AppSettings {
    /// Configured bind host, falling back to all interfaces.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Configured port, falling back to 3000.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Parsed deployment mode, falling back to development.
    ///
    /// # Errors
    /// Returns [`SettingsError::UnknownEnvironment`] for unsupported names.
    pub fn environment(&self) -> Result<Environment, SettingsError> {
        self.environment
            .as_deref()
            .map_or(Ok(Environment::default()), Environment::from_str)
    }

    /// Credentials checked by the protected endpoints.
    #[must_use]
    pub fn credentials(&self) -> BasicCredentials {
        BasicCredentials::new(
            self.basic_auth_user.as_deref().unwrap_or(DEFAULT_USER),
            self.basic_auth_password
                .as_deref()
                .unwrap_or(DEFAULT_PASSWORD),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 5] = [
        "CARBON_HOST",
        "CARBON_PORT",
        "CARBON_ENVIRONMENT",
        "CARBON_BASIC_AUTH_USER",
        "CARBON_BASIC_AUTH_PASSWORD",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("carbon-api")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.host(), "0.0.0.0");
        assert_eq!(settings.port(), 3000);
        assert_eq!(settings.environment(), Ok(Environment::Development));
        assert!(settings.credentials().verify("admin", "password"));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CARBON_HOST", Some("127.0.0.1".to_owned())),
            ("CARBON_PORT", Some("8081".to_owned())),
            ("CARBON_ENVIRONMENT", Some("production".to_owned())),
            ("CARBON_BASIC_AUTH_USER", Some("chef".to_owned())),
            ("CARBON_BASIC_AUTH_PASSWORD", Some("s3cret".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.host(), "127.0.0.1");
        assert_eq!(settings.port(), 8081);
        assert_eq!(settings.environment(), Ok(Environment::Production));
        let credentials = settings.credentials();
        assert!(credentials.verify("chef", "s3cret"));
        assert!(!credentials.verify("admin", "password"));
    }

    #[rstest]
    #[case("development", Environment::Development)]
    #[case("Production", Environment::Production)]
    #[case(" test ", Environment::Test)]
    fn environment_names_parse(#[case] raw: &str, #[case] expected: Environment) {
        assert_eq!(raw.parse::<Environment>(), Ok(expected));
    }

    #[rstest]
    fn unknown_environment_is_rejected() {
        let err = "staging".parse::<Environment>().expect_err("unknown mode");
        assert_eq!(err, SettingsError::UnknownEnvironment("staging".to_owned()));
    }

    #[rstest]
    #[case(Environment::Development, false)]
    #[case(Environment::Test, false)]
    #[case(Environment::Production, true)]
    fn only_production_is_production(#[case] environment: Environment, #[case] expected: bool) {
        assert_eq!(environment.is_production(), expected);
    }
}
