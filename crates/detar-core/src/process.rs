//! Process-global state touched by extraction.
//!
//! The file mode creation mask is shared by every thread of the process.
//! [`UmaskGuard`] holds it for the length of one extraction and puts the
//! previous value back when dropped, so only one extraction may run per
//! process at a time unless the caller serializes them.

use log::debug;
use nix::sys::stat::Mode;
use nix::sys::stat::umask;
use nix::unistd::Uid;

/// Scoped replacement of the process umask.
///
/// # Examples
///
/// ```
/// use detar_core::process::UmaskGuard;
///
/// {
///     let _guard = UmaskGuard::clear();
///     // files created here get exactly the requested mode
/// }
/// // previous mask restored
/// ```
#[derive(Debug)]
#[must_use = "the previous umask is restored as soon as the guard is dropped"]
pub struct UmaskGuard {
    previous: Mode,
}

impl UmaskGuard {
    /// Sets the umask to `0` until the guard is dropped.
    pub fn clear() -> Self {
        Self::set(Mode::empty())
    }

    /// Sets the umask to `mask` until the guard is dropped.
    pub fn set(mask: Mode) -> Self {
        let previous = umask(mask);
        debug!("umask set to {:#o} (was {:#o})", mask.bits(), previous.bits());
        Self { previous }
    }

    /// The mask that is restored on drop.
    #[must_use]
    pub const fn previous(&self) -> Mode {
        self.previous
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        umask(self.previous);
        debug!("umask restored to {:#o}", self.previous.bits());
    }
}

/// Returns `true` if the process may give files away to other owners.
///
/// This is the effective user id being root.
#[must_use]
pub fn is_privileged() -> bool {
    Uid::effective().is_root()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only test in this crate's unit tests that touches the umask. It
    // widens the mask to zero, which never changes what other tests expect.
    #[test]
    fn test_umask_guard_restores_previous() {
        let before = umask(Mode::empty());
        umask(before);

        {
            let guard = UmaskGuard::clear();
            assert_eq!(guard.previous(), before);

            let inside = umask(Mode::empty());
            assert_eq!(inside, Mode::empty());
        }

        let after = umask(before);
        assert_eq!(after, before);
    }

    #[test]
    fn test_is_privileged_matches_euid() {
        assert_eq!(is_privileged(), Uid::effective().as_raw() == 0);
    }
}
