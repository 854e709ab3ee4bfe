//! raw bindings to the host's `*xattr` calls
//!
//! every function takes an already-converted C path and name. an empty
//! buffer is passed as a null pointer with size 0, which makes `list` and
//! `get` report the size they need instead of copying anything.

use std::ffi::CStr;
use std::ptr;

use nix::errno::Errno;
use nix::libc;

use crate::options::XattrFlags;

/// negative means failure; errno is read before anything else can touch it
fn check(ret: isize) -> nix::Result<usize> {
    if ret < 0 {
        Err(Errno::last())
    } else {
        Ok(ret as usize)
    }
}

fn out_ptr(buf: &mut [u8]) -> *mut libc::c_void {
    if buf.is_empty() {
        ptr::null_mut()
    } else {
        buf.as_mut_ptr().cast()
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod imp {
    use super::*;

    fn set_flags(flags: XattrFlags) -> libc::c_int {
        let mut out = 0;
        if flags.contains(XattrFlags::CREATE) {
            out |= libc::XATTR_CREATE;
        }
        if flags.contains(XattrFlags::REPLACE) {
            out |= libc::XATTR_REPLACE;
        }
        out
    }

    pub fn list(path: &CStr, buf: &mut [u8], flags: XattrFlags) -> nix::Result<usize> {
        let (data, len) = (out_ptr(buf).cast::<libc::c_char>(), buf.len());
        let ret = unsafe {
            if flags.contains(XattrFlags::NOFOLLOW) {
                libc::llistxattr(path.as_ptr(), data, len)
            } else {
                libc::listxattr(path.as_ptr(), data, len)
            }
        };
        check(ret)
    }

    pub fn get(path: &CStr, name: &CStr, buf: &mut [u8], flags: XattrFlags) -> nix::Result<usize> {
        let (data, len) = (out_ptr(buf), buf.len());
        let ret = unsafe {
            if flags.contains(XattrFlags::NOFOLLOW) {
                libc::lgetxattr(path.as_ptr(), name.as_ptr(), data, len)
            } else {
                libc::getxattr(path.as_ptr(), name.as_ptr(), data, len)
            }
        };
        check(ret)
    }

    pub fn set(path: &CStr, name: &CStr, value: &[u8], flags: XattrFlags) -> nix::Result<()> {
        let data = value.as_ptr().cast::<libc::c_void>();
        let ret = unsafe {
            if flags.contains(XattrFlags::NOFOLLOW) {
                libc::lsetxattr(path.as_ptr(), name.as_ptr(), data, value.len(), set_flags(flags))
            } else {
                libc::setxattr(path.as_ptr(), name.as_ptr(), data, value.len(), set_flags(flags))
            }
        };
        check(ret as isize).map(drop)
    }

    pub fn remove(path: &CStr, name: &CStr, flags: XattrFlags) -> nix::Result<()> {
        let ret = unsafe {
            if flags.contains(XattrFlags::NOFOLLOW) {
                libc::lremovexattr(path.as_ptr(), name.as_ptr())
            } else {
                libc::removexattr(path.as_ptr(), name.as_ptr())
            }
        };
        check(ret as isize).map(drop)
    }

}

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod imp {
    use super::*;

    fn options(flags: XattrFlags) -> libc::c_int {
        flags.bits() as libc::c_int
    }

    pub fn list(path: &CStr, buf: &mut [u8], flags: XattrFlags) -> nix::Result<usize> {
        let (data, len) = (out_ptr(buf).cast::<libc::c_char>(), buf.len());
        let ret = unsafe { libc::listxattr(path.as_ptr(), data, len, options(flags)) };
        check(ret)
    }

    pub fn get(path: &CStr, name: &CStr, buf: &mut [u8], flags: XattrFlags) -> nix::Result<usize> {
        let (data, len) = (out_ptr(buf), buf.len());
        let ret =
            unsafe { libc::getxattr(path.as_ptr(), name.as_ptr(), data, len, 0, options(flags)) };
        check(ret)
    }

    pub fn set(path: &CStr, name: &CStr, value: &[u8], flags: XattrFlags) -> nix::Result<()> {
        let data = value.as_ptr().cast::<libc::c_void>();
        let ret = unsafe {
            libc::setxattr(path.as_ptr(), name.as_ptr(), data, value.len(), 0, options(flags))
        };
        check(ret as isize).map(drop)
    }

    pub fn remove(path: &CStr, name: &CStr, flags: XattrFlags) -> nix::Result<()> {
        let ret = unsafe { libc::removexattr(path.as_ptr(), name.as_ptr(), options(flags)) };
        check(ret as isize).map(drop)
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
compile_error!("extended attributes are only supported on linux, android, macos and ios");

pub use imp::{get, list, remove, set};
