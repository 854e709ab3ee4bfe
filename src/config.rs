use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::handle::XattrHandle;

/// how attribute values are rendered and parsed by the command line tool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// utf-8, invalid sequences replaced on output
    #[default]
    Text,
    /// lowercase hex
    Hex,
    /// bytes written as-is
    Raw,
}

impl ValueEncoding {
    /// render a value for display
    pub fn encode(&self, value: &[u8]) -> Vec<u8> {
        match self {
            ValueEncoding::Text => String::from_utf8_lossy(value).into_owned().into_bytes(),
            ValueEncoding::Hex => hex::encode(value).into_bytes(),
            ValueEncoding::Raw => value.to_vec(),
        }
    }

    /// parse a value given on the command line
    pub fn decode(&self, input: &str) -> Result<Vec<u8>> {
        match self {
            ValueEncoding::Hex => Ok(hex::decode(input.trim())?),
            ValueEncoding::Text | ValueEncoding::Raw => Ok(input.as_bytes().to_vec()),
        }
    }
}

impl fmt::Display for ValueEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueEncoding::Text => write!(f, "text"),
            ValueEncoding::Hex => write!(f, "hex"),
            ValueEncoding::Raw => write!(f, "raw"),
        }
    }
}

/// defaults for the command line tool, stored as toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// operate on symlink targets rather than the links
    pub follow_symlinks: bool,
    /// value rendering
    pub encoding: ValueEncoding,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// handle for `path` with the configured symlink behavior
    pub fn handle(&self, path: impl Into<PathBuf>) -> XattrHandle {
        let mut handle = XattrHandle::new(path);
        handle.set_follow_symlinks(self.follow_symlinks);
        handle
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            encoding: ValueEncoding::Text,
        }
    }
}
