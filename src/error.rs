use std::path::PathBuf;

use nix::errno::Errno;

/// error type for xattr operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// a native xattr call returned a negative value
    #[error(
        "{op} failed on {}{}: {source}",
        .path.display(),
        .name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default()
    )]
    Os {
        op: &'static str,
        path: PathBuf,
        name: Option<String>,
        #[source]
        source: Errno,
    },

    #[error("invalid attribute name: {0:?}")]
    InvalidName(String),

    #[error("value of {name} on {} is not valid utf-8", .path.display())]
    NotUtf8 {
        path: PathBuf,
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid hex value: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl Error {
    /// errno reported by the failing call, if this came from the OS
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Error::Os { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// the named attribute does not exist
    pub fn is_not_found(&self) -> bool {
        self.errno() == Some(NOT_FOUND)
    }

    /// the named attribute already exists (create-only set)
    pub fn is_exists(&self) -> bool {
        self.errno() == Some(Errno::EEXIST)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
const NOT_FOUND: Errno = Errno::ENODATA;

#[cfg(any(target_os = "macos", target_os = "ios"))]
const NOT_FOUND: Errno = Errno::ENOATTR;

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_error(source: Errno) -> Error {
        Error::Os {
            op: "getxattr",
            path: PathBuf::from("/tmp/file"),
            name: Some("user.test".into()),
            source,
        }
    }

    #[test]
    fn test_os_error_display_includes_name() {
        let msg = os_error(Errno::EACCES).to_string();
        assert!(msg.starts_with("getxattr failed on /tmp/file (user.test): "));
    }

    #[test]
    fn test_os_error_display_without_name() {
        let err = Error::Os {
            op: "listxattr",
            path: PathBuf::from("/tmp/file"),
            name: None,
            source: Errno::ENOENT,
        };
        assert!(err.to_string().starts_with("listxattr failed on /tmp/file: "));
    }

    #[test]
    fn test_error_classification() {
        assert!(os_error(NOT_FOUND).is_not_found());
        assert!(!os_error(NOT_FOUND).is_exists());
        assert!(os_error(Errno::EEXIST).is_exists());
        assert_eq!(os_error(Errno::EPERM).errno(), Some(Errno::EPERM));
        assert_eq!(Error::InvalidName("a\0b".into()).errno(), None);
    }
}
