//! Session tokens and attributes.

use rand::RngCore;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;

use super::errors::{SessionError, SessionResult};

/// Attribute key holding the authenticated username.
pub const USERNAME_KEY: &str = "username";

const TOKEN_BYTES: usize = 32;

/// Opaque session identifier handed to the client.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token: 256 random bits, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a token received from a client.
    pub fn from_client(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens are bearer credentials; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionToken({prefix}…)")
    }
}

/// Attribute set attached to a session.
///
/// Values are stored as JSON and read back through typed accessors, which
/// report [`SessionError::MalformedSession`] instead of panicking when a
/// value has the wrong shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionAttributes(Map<String, Value>);

impl SessionAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes carrying only a username.
    pub fn for_user(username: &str) -> Self {
        let mut attrs = Self::new();
        attrs.set_username(username);
        attrs
    }

    /// The authenticated username, if set.
    ///
    /// # Errors
    ///
    /// * `SessionError::MalformedSession` - the stored value is not a string
    pub fn username(&self) -> SessionResult<Option<&str>> {
        match self.0.get(USERNAME_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(name)) => Ok(Some(name.as_str())),
            Some(_) => Err(SessionError::MalformedSession {
                key: USERNAME_KEY.to_string(),
            }),
        }
    }

    pub fn set_username(&mut self, username: &str) {
        self.0
            .insert(USERNAME_KEY.to_string(), Value::String(username.to_string()));
    }

    /// Read an attribute as `T`.
    ///
    /// # Errors
    ///
    /// * `SessionError::MalformedSession` - the value does not deserialize as `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> SessionResult<Option<T>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| SessionError::MalformedSession {
                    key: key.to_string(),
                }),
        }
    }

    /// Store an attribute.
    pub fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> SessionResult<()> {
        self.0.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
