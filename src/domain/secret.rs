//! Redacting container for generated passwords.
//!
//! Generated passwords travel inside [`AccountSpec`](super::AccountSpec) from the
//! generator to the vault and back to the caller. Every rendering path other
//! than [`SecretString::expose_secret`] prints `[REDACTED]`, so a spec can be
//! formatted into a log line or an error message without leaking it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A password that never shows up in Debug, Display or serialized output.
///
/// The backing memory is zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw password. Only the vault transport and the final
    /// caller-facing output should need this.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Serializes the real value. Use with `#[serde(serialize_with = ...)]` on
/// structures that are handed back to the operator on purpose.
pub fn expose<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_redacted_everywhere() {
        let secret = SecretString::new("Ab1!cd2#Ef3%");

        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");
        assert_eq!(secret.expose_secret(), "Ab1!cd2#Ef3%");
    }

    #[test]
    fn test_expose_serializer_writes_value() {
        #[derive(Serialize)]
        struct Handout {
            #[serde(serialize_with = "expose")]
            password: SecretString,
        }

        let json = serde_json::to_string(&Handout { password: "visible".into() }).unwrap();
        assert_eq!(json, r#"{"password":"visible"}"#);
    }

    #[test]
    fn test_deserialize_accepts_raw_value() {
        let secret: SecretString = serde_json::from_str("\"from-vault\"").unwrap();
        assert_eq!(secret.expose_secret(), "from-vault");
        assert_eq!(secret.len(), 10);
        assert!(!secret.is_empty());
    }
}
