//! The key-value environment the hook reads from and writes to.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

pub const CLIENT_ID: &str = "client_id";
pub const CLIENT_SECRET: &str = "client_secret";
pub const TOKEN_URL: &str = "token_url";
pub const JWT_TOKEN: &str = "jwt_token";

/// A mutable string map owned by the host.
///
/// The hook only ever touches the keys named in this module.
pub trait EnvironmentStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrites any previous value.
    fn set(&mut self, key: &str, value: &str);
}

impl EnvironmentStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

/// A store that answers one key from a fixed value and forwards the rest.
///
/// Writes to the overridden key are kept in the overlay, so the inner store
/// never sees them.
pub struct Overlay<'a, S: ?Sized> {
    inner: &'a mut S,
    key: &'a str,
    value: String,
}

impl<'a, S: EnvironmentStore + ?Sized> Overlay<'a, S> {
    pub fn new(inner: &'a mut S, key: &'a str, value: impl Into<String>) -> Self {
        Self {
            inner,
            key,
            value: value.into(),
        }
    }
}

impl<S: EnvironmentStore + ?Sized> EnvironmentStore for Overlay<'_, S> {
    fn get(&self, key: &str) -> Option<String> {
        if key == self.key {
            return Some(self.value.clone());
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        if key == self.key {
            self.value = value.to_string();
        } else {
            self.inner.set(key, value);
        }
    }
}

/// One entry of an exported environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnvironmentVariable {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            kind: None,
            enabled: true,
            extra: Map::new(),
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

/// An environment document as exported by the API-testing tool.
///
/// Fields this crate does not know about are carried through `save`
/// untouched. Documents wrapped as `{"environment": {...}}` (the shape the
/// tool's web API uses) are saved back in the same shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostmanEnvironment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnvironmentVariable>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    wrapped: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Wrapped { environment: PostmanEnvironment },
    Bare(PostmanEnvironment),
}

#[derive(Serialize)]
struct WrappedRef<'a> {
    environment: &'a PostmanEnvironment,
}

impl PostmanEnvironment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// The environment a fresh workspace starts with: demo credentials and an
    /// empty `jwt_token` slot for the hook to fill.
    pub fn starter(name: &str) -> Self {
        let mut env = Self::new(name);
        env.values = vec![
            EnvironmentVariable::new(CLIENT_ID, "demo_client_id_123"),
            EnvironmentVariable::new(CLIENT_SECRET, "demo_secret"),
            EnvironmentVariable::new(TOKEN_URL, "https://auth.example.com/token"),
            EnvironmentVariable::new(JWT_TOKEN, ""),
        ];
        env
    }

    pub fn from_json(json: &str) -> Result<Self, EnvironmentError> {
        Ok(match serde_json::from_str(json)? {
            Document::Wrapped { mut environment } => {
                environment.wrapped = true;
                environment
            }
            Document::Bare(environment) => environment,
        })
    }

    pub fn to_json(&self) -> Result<String, EnvironmentError> {
        let json = if self.wrapped {
            serde_json::to_string_pretty(&WrappedRef { environment: self })?
        } else {
            serde_json::to_string_pretty(self)?
        };
        Ok(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvironmentError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading environment.");
        let json = fs::read_to_string(path).map_err(|source| EnvironmentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EnvironmentError> {
        let path = path.as_ref();
        debug!(path = %path.display(), variables = self.values.len(), "Saving environment.");
        fs::write(path, self.to_json()?).map_err(|source| EnvironmentError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl EnvironmentStore for PostmanEnvironment {
    /// Disabled entries read as absent, the same as in the host tool.
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .iter()
            .find(|var| var.enabled && var.key == key)
            .map(|var| var.value.clone())
    }

    /// Prefers the entry `get` would read, then any entry with the key.
    fn set(&mut self, key: &str, value: &str) {
        let index = self
            .values
            .iter()
            .position(|var| var.enabled && var.key == key)
            .or_else(|| self.values.iter().position(|var| var.key == key));

        match index {
            Some(i) => {
                let var = &mut self.values[i];
                var.value = value.to_string();
                var.enabled = true;
            }
            None => self.values.push(EnvironmentVariable::new(key, value)),
        }
    }
}

/// An error reading or writing an environment document.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("could not access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid environment document: {0}")]
    Json(#[from] serde_json::Error),
}
