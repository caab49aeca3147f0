//! API key sources
//!
//! The key is a request parameter of the script URL, so it is visible to
//! anyone who loads the page. Restrict it on the provider side; none of the
//! sources here make it secret.

use crate::{constants::API_KEY_ENV, MapError, Result};

/// Anything that can produce the mapping API key
pub trait CredentialSource: Send + Sync {
    fn api_key(&self) -> Result<String>;
}

impl<T: CredentialSource + ?Sized> CredentialSource for Box<T> {
    fn api_key(&self) -> Result<String> {
        (**self).api_key()
    }
}

/// A key supplied directly, e.g. from a command line flag
#[derive(Debug, Clone)]
pub struct StaticKey(String);

impl StaticKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl CredentialSource for StaticKey {
    fn api_key(&self) -> Result<String> {
        if self.0.trim().is_empty() {
            return Err(MapError::Credentials("API key is empty".into()));
        }
        Ok(self.0.clone())
    }
}

/// Key stored as underscore-delimited decimal code points, e.g. `72_105`
/// for `Hi`. Obfuscation only; kept for deployments that still embed keys
/// this way.
#[derive(Debug, Clone)]
pub struct CharCodeKey {
    codes: String,
}

impl CharCodeKey {
    pub fn new(codes: impl Into<String>) -> Self {
        Self {
            codes: codes.into(),
        }
    }

    /// Maps every code point in the sequence to its character
    pub fn decode(codes: &str) -> Result<String> {
        codes
            .split('_')
            .map(|code| {
                let value: u32 = code.trim().parse().map_err(|_| {
                    MapError::Credentials(format!("invalid character code {code:?}"))
                })?;
                char::from_u32(value).ok_or_else(|| {
                    MapError::Credentials(format!("{value} is not a valid code point"))
                })
            })
            .collect()
    }

    /// Inverse of [`CharCodeKey::decode`]
    pub fn encode(key: &str) -> String {
        key.chars()
            .map(|c| (c as u32).to_string())
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl CredentialSource for CharCodeKey {
    fn api_key(&self) -> Result<String> {
        Self::decode(&self.codes)
    }
}

/// Reads the key from the process environment, loading a `.env` file first
/// when one is present
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    variable: String,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::with_variable(API_KEY_ENV)
    }

    pub fn with_variable(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Result<String> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("ignoring unreadable .env file: {}", e),
        }

        match std::env::var(&self.variable) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(MapError::Credentials(format!(
                "environment variable {} is not set",
                self.variable
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_char_codes() {
        assert_eq!(CharCodeKey::decode("72_105").unwrap(), "Hi");
        assert_eq!(CharCodeKey::decode("65_73_122_97").unwrap(), "AIza");
    }

    #[test]
    fn test_decode_is_deterministic() {
        let codes = "65_73_122_97_83_121_66_112_104_72";
        let first = CharCodeKey::new(codes).api_key().unwrap();
        for _ in 0..3 {
            assert_eq!(CharCodeKey::new(codes).api_key().unwrap(), first);
        }
        assert_eq!(first, "AIzaSyBphH");
    }

    #[test]
    fn test_encode_inverts_decode() {
        let key = "AIzaSy-test_key";
        assert_eq!(CharCodeKey::decode(&CharCodeKey::encode(key)).unwrap(), key);
    }

    #[test]
    fn test_malformed_codes_rejected() {
        assert!(matches!(
            CharCodeKey::decode("72_x"),
            Err(MapError::Credentials(_))
        ));
        assert!(matches!(
            CharCodeKey::decode("55296"),
            Err(MapError::Credentials(_))
        ));
    }

    #[test]
    fn test_static_key() {
        assert_eq!(StaticKey::new("abc").api_key().unwrap(), "abc");
        assert!(StaticKey::new("  ").api_key().is_err());
    }

    #[test]
    fn test_env_credentials_missing_variable() {
        let source = EnvCredentials::with_variable("ROUTEMAP_TEST_UNSET_KEY_VARIABLE");
        assert!(matches!(source.api_key(), Err(MapError::Credentials(_))));
    }
}
