//! On-disk token storage.
//!
//! Tokens are kept as one JSON blob under a fixed key, so the file can hold
//! other entries next to it. Writes go through a temp file and a rename.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::auth::AuthTokens;
use crate::error::Result;

/// Key the token blob is stored under.
pub const TOKEN_KEY: &str = "authTokens";

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store backed by `<dir>/auth.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join("auth.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write_all(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(entries)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }

    /// Stored tokens, `None` when nothing has been saved.
    pub fn load(&self) -> Result<Option<AuthTokens>> {
        let entries = self.read_all()?;
        match entries.get(TOKEN_KEY) {
            Some(Value::String(blob)) => Ok(Some(serde_json::from_str(blob)?)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Ok(Some(serde_json::from_value(other.clone())?)),
        }
    }

    pub fn save(&self, tokens: &AuthTokens) -> Result<()> {
        let mut entries = self.read_all()?;
        let blob = serde_json::to_string(tokens)?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(blob));
        self.write_all(&entries)
    }

    pub fn clear(&self) -> Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
