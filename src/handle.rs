use std::ffi::{CStr, CString, OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use nix::NixPath;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::options::{SetOptions, XattrFlags};
use crate::sys;
use crate::types::Xattr;

/// extended attributes of one filesystem path
///
/// the path is resolved by name on every call; no descriptor is held and the
/// path is not checked until an operation runs. `follow_symlinks` decides
/// whether a symbolic link's target (the default) or the link itself is
/// operated on.
///
/// attribute names are taken as `OsStr`, so any name the OS reports through
/// [`list_os`](Self::list_os) can be passed back unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XattrHandle {
    path: PathBuf,
    follow_symlinks: bool,
}

impl XattrHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            follow_symlinks: true,
        }
    }

    /// builder form of `set_follow_symlinks(false)`
    pub fn no_follow(mut self) -> Self {
        self.follow_symlinks = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    pub fn set_follow_symlinks(&mut self, follow: bool) {
        self.follow_symlinks = follow;
    }

    pub(crate) fn follow_symlinks_option(&self) -> XattrFlags {
        if self.follow_symlinks {
            XattrFlags::empty()
        } else {
            XattrFlags::NOFOLLOW
        }
    }

    /// names of all attributes, in the order the OS reports them
    ///
    /// names that are not utf-8 are converted lossily and cannot be read back
    /// by the returned string; use [`list_os`](Self::list_os) for those.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .list_os()?
            .into_iter()
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    /// names of all attributes exactly as the OS reports them
    pub fn list_os(&self) -> Result<Vec<OsString>> {
        let flags = self.follow_symlinks_option();
        let buf = self.call("listxattr", None, |path| {
            probe_then_fill(|buf| sys::list(path, buf, flags))
        })?;

        let names = split_names(&buf);
        debug!(path = %self.path.display(), count = names.len(), "listed xattrs");
        Ok(names)
    }

    /// raw value of an attribute
    pub fn get(&self, name: impl AsRef<OsStr>) -> Result<Vec<u8>> {
        let name = name.as_ref();
        let flags = self.follow_symlinks_option();
        let c_name = attr_name(name)?;
        let value = self.call("getxattr", Some(name), |path| {
            probe_then_fill(|buf| sys::get(path, &c_name, buf, flags))
        })?;

        debug!(
            path = %self.path.display(),
            name = %name.to_string_lossy(),
            len = value.len(),
            "read xattr"
        );
        Ok(value)
    }

    /// value of an attribute decoded as utf-8
    ///
    /// values are arbitrary bytes; this fails rather than replacing invalid
    /// sequences.
    pub fn get_string(&self, name: impl AsRef<OsStr>) -> Result<String> {
        let name = name.as_ref();
        let value = self.get(name)?;
        String::from_utf8(value).map_err(|source| Error::NotUtf8 {
            path: self.path.clone(),
            name: name.to_string_lossy().into_owned(),
            source,
        })
    }

    /// set an attribute, returning the value that was written
    ///
    /// see `setxattr(2)` for the errors create-only and replace-only produce.
    pub fn set(
        &self,
        name: impl AsRef<OsStr>,
        value: impl AsRef<[u8]>,
        options: SetOptions,
    ) -> Result<Vec<u8>> {
        let (name, value) = (name.as_ref(), value.as_ref());
        let flags = self.follow_symlinks_option() | options.flags();
        let c_name = attr_name(name)?;
        self.call("setxattr", Some(name), |path| sys::set(path, &c_name, value, flags))?;

        debug!(
            path = %self.path.display(),
            name = %name.to_string_lossy(),
            len = value.len(),
            ?flags,
            "set xattr"
        );
        Ok(value.to_vec())
    }

    /// remove an attribute, returning its last value
    ///
    /// the value is read before removal, so a missing attribute fails the
    /// same way `get` does. the read and the removal are two separate calls;
    /// a concurrent writer can change the value in between.
    pub fn remove(&self, name: impl AsRef<OsStr>) -> Result<Vec<u8>> {
        let name = name.as_ref();
        let value = self.get(name)?;
        let flags = self.follow_symlinks_option();
        let c_name = attr_name(name)?;
        self.call("removexattr", Some(name), |path| sys::remove(path, &c_name, flags))?;

        debug!(path = %self.path.display(), name = %name.to_string_lossy(), "removed xattr");
        Ok(value)
    }

    /// every attribute with its value, in list order
    ///
    /// names are read back exactly as listed. an attribute removed between
    /// the list and its read is skipped.
    pub fn attributes(&self) -> Result<Vec<Xattr>> {
        let mut xattrs = Vec::new();

        for name in self.list_os()? {
            match self.get(&name) {
                Ok(value) => xattrs.push(Xattr::new(name.to_string_lossy(), value)),
                Err(e) if e.is_not_found() => {
                    // removed since the list call
                    debug!(
                        path = %self.path.display(),
                        name = %name.to_string_lossy(),
                        "xattr vanished"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(xattrs)
    }

    /// run a native call against the path, attaching context to any errno
    fn call<T>(
        &self,
        op: &'static str,
        name: Option<&OsStr>,
        f: impl FnOnce(&CStr) -> nix::Result<T>,
    ) -> Result<T> {
        self.path
            .with_nix_path(f)
            .and_then(|res| res)
            .map_err(|source| Error::Os {
                op,
                path: self.path.clone(),
                name: name.map(|n| n.to_string_lossy().into_owned()),
                source,
            })
    }
}

/// size with a null buffer, then read into a buffer of exactly that size
///
/// a zero probe is the final answer: filling a null buffer would only report
/// a length again, never data.
fn probe_then_fill(
    mut call: impl FnMut(&mut [u8]) -> nix::Result<usize>,
) -> nix::Result<Vec<u8>> {
    let len = call(&mut [])?;
    trace!(len, "xattr probe");
    if len == 0 {
        return Ok(Vec::new());
    }

    let mut buf = vec![0u8; len];
    let filled = call(&mut buf)?;
    buf.truncate(filled);
    Ok(buf)
}

fn attr_name(name: &OsStr) -> Result<CString> {
    CString::new(name.as_bytes())
        .map_err(|_| Error::InvalidName(name.to_string_lossy().into_owned()))
}

/// split a listxattr buffer of NUL-terminated names
fn split_names(buf: &[u8]) -> Vec<OsString> {
    buf.split(|&b| b == 0)
        .filter(|name| !name.is_empty())
        .map(|name| OsString::from_vec(name.to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_to_following() {
        let handle = XattrHandle::new("/nonexistent/path");
        assert!(handle.follow_symlinks());
        assert_eq!(handle.path(), Path::new("/nonexistent/path"));
        assert_eq!(handle.follow_symlinks_option(), XattrFlags::empty());
    }

    #[test]
    fn test_no_follow_sets_flag() {
        let mut handle = XattrHandle::new("link").no_follow();
        assert!(!handle.follow_symlinks());
        assert_eq!(handle.follow_symlinks_option(), XattrFlags::NOFOLLOW);

        handle.set_follow_symlinks(true);
        assert_eq!(handle.follow_symlinks_option(), XattrFlags::empty());
    }

    #[test]
    fn test_split_names() {
        assert!(split_names(b"").is_empty());
        assert_eq!(split_names(b"user.a\0"), vec!["user.a"]);
        // order is kept, duplicates are not removed
        assert_eq!(
            split_names(b"user.b\0user.a\0user.b\0"),
            vec!["user.b", "user.a", "user.b"]
        );
    }

    #[test]
    fn test_split_names_keeps_non_utf8_bytes() {
        let names = split_names(b"user.\xffbad\0user.ok\0");
        assert_eq!(names[0].as_bytes(), b"user.\xffbad");
        assert_eq!(names[1], "user.ok");
    }

    #[test]
    fn test_probe_then_fill_reads_probed_length() {
        let mut calls = Vec::new();
        let value = probe_then_fill(|buf| {
            calls.push(buf.len());
            buf.copy_from_slice(&b"abc"[..buf.len()]);
            Ok(3)
        })
        .unwrap();
        assert_eq!(value, b"abc");
        assert_eq!(calls, vec![0, 3]);
    }

    #[test]
    fn test_probe_then_fill_zero_probe_skips_fill() {
        // a value that appears after a zero probe must not come back empty
        // from a second null-buffer call
        let mut calls = 0;
        let value = probe_then_fill(|_| {
            calls += 1;
            Ok(if calls == 1 { 0 } else { 8 })
        })
        .unwrap();
        assert!(value.is_empty());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_probe_then_fill_truncates_shrunk_value() {
        let value = probe_then_fill(|buf| {
            if buf.is_empty() {
                return Ok(6);
            }
            buf[..2].copy_from_slice(b"hi");
            Ok(2)
        })
        .unwrap();
        assert_eq!(value, b"hi");
    }

    #[test]
    fn test_probe_then_fill_passes_fill_error() {
        let err = probe_then_fill(|buf| {
            if buf.is_empty() {
                Ok(4)
            } else {
                Err(nix::errno::Errno::ERANGE)
            }
        })
        .unwrap_err();
        assert_eq!(err, nix::errno::Errno::ERANGE);
    }

    #[test]
    fn test_name_with_nul_is_rejected() {
        let handle = XattrHandle::new("/nonexistent/path");
        let err = handle.get("user.a\0b").unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
    }

    #[test]
    fn test_missing_path_reports_enoent() {
        let handle = XattrHandle::new("/nonexistent/xattr-handle/path");
        let err = handle.list().unwrap_err();
        assert_eq!(err.errno(), Some(nix::errno::Errno::ENOENT));
        match err {
            Error::Os { op, name, .. } => {
                assert_eq!(op, "listxattr");
                assert!(name.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_remove_on_missing_path_fails_at_get() {
        let handle = XattrHandle::new("/nonexistent/xattr-handle/path");
        match handle.remove("user.test").unwrap_err() {
            Error::Os { op, .. } => assert_eq!(op, "getxattr"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
