use bitflags::bitflags;

bitflags! {
    /// option word passed to the native xattr calls
    ///
    /// bit values are the ones the darwin attribute subsystem defines; on
    /// linux they are translated in `sys`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct XattrFlags: u32 {
        /// act on a symbolic link itself instead of its target
        const NOFOLLOW = 0x0001;
        /// set the value, fail if the attribute already exists
        const CREATE = 0x0002;
        /// set the value, fail if the attribute does not exist
        const REPLACE = 0x0004;
    }
}

/// options for [`XattrHandle::set`](crate::XattrHandle::set)
///
/// leaving both unset allows creation and replacement. setting both is not
/// rejected here; the OS refuses the combination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// fail if the named attribute already exists
    pub create: bool,
    /// fail if the named attribute does not exist
    pub replace: bool,
}

impl SetOptions {
    /// create-only
    pub fn create() -> Self {
        Self {
            create: true,
            replace: false,
        }
    }

    /// replace-only
    pub fn replace() -> Self {
        Self {
            create: false,
            replace: true,
        }
    }

    pub fn flags(&self) -> XattrFlags {
        let mut flags = XattrFlags::empty();
        if self.create {
            flags |= XattrFlags::CREATE;
        }
        if self.replace {
            flags |= XattrFlags::REPLACE;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values() {
        assert_eq!(XattrFlags::NOFOLLOW.bits(), 0x0001);
        assert_eq!(XattrFlags::CREATE.bits(), 0x0002);
        assert_eq!(XattrFlags::REPLACE.bits(), 0x0004);
    }

    #[test]
    fn test_default_options_have_no_flags() {
        assert!(SetOptions::default().flags().is_empty());
    }

    #[test]
    fn test_options_compose() {
        assert_eq!(SetOptions::create().flags(), XattrFlags::CREATE);
        assert_eq!(SetOptions::replace().flags(), XattrFlags::REPLACE);

        // both is passed through untouched
        let both = SetOptions {
            create: true,
            replace: true,
        };
        assert_eq!(both.flags(), XattrFlags::CREATE | XattrFlags::REPLACE);
        assert_eq!(both.flags().bits(), 0x0006);
    }

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    #[test]
    fn test_flags_match_darwin_constants() {
        use nix::libc;
        assert_eq!(XattrFlags::NOFOLLOW.bits() as libc::c_int, libc::XATTR_NOFOLLOW);
        assert_eq!(XattrFlags::CREATE.bits() as libc::c_int, libc::XATTR_CREATE);
        assert_eq!(XattrFlags::REPLACE.bits() as libc::c_int, libc::XATTR_REPLACE);
    }
}
