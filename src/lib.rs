//! xattr-handle - extended attributes through a path-bound handle
//!
//! a thin layer over the host's `listxattr`, `getxattr`, `setxattr` and
//! `removexattr` calls. values are opaque bytes; nothing is cached.
//!
//! # Probe then fill
//!
//! attribute lists and values have no known size up front. `list` and `get`
//! first call the OS with a null buffer to learn the length, then again with
//! a buffer of exactly that length.
//!
//! # Example usage
//!
//! ```no_run
//! use xattr_handle::{SetOptions, XattrHandle};
//!
//! let handle = XattrHandle::new("/path/to/file");
//! handle.set("user.origin", "https://example.com", SetOptions::default()).unwrap();
//! assert_eq!(handle.get("user.origin").unwrap(), b"https://example.com");
//!
//! for name in handle.list().unwrap() {
//!     println!("{}", name);
//! }
//!
//! // act on a symlink itself instead of its target
//! let link = XattrHandle::new("/path/to/link").no_follow();
//! match link.get("user.origin") {
//!     Err(e) if e.is_not_found() => println!("no origin on the link"),
//!     other => println!("{:?}", other),
//! }
//! ```

mod config;
mod error;
mod handle;
mod options;
mod sys;
mod types;

pub use config::{Config, ValueEncoding};
pub use error::{Error, IoResultExt, Result};
pub use handle::XattrHandle;
pub use nix::errno::Errno;
pub use options::{SetOptions, XattrFlags};
pub use types::Xattr;
