//! Extraction configuration.

use crate::process::is_privileged;

/// Whether owner and group are restored on extracted objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipPolicy {
    /// Restore ownership only when the process is privileged.
    #[default]
    Auto,
    /// Always restore ownership. Fails on objects the process may not give
    /// away.
    Always,
    /// Never restore ownership.
    Never,
}

impl OwnershipPolicy {
    /// Decides, once per extraction, whether ownership is restored.
    #[must_use]
    pub fn resolve(self) -> bool {
        match self {
            Self::Auto => is_privileged(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Extraction settings.
///
/// # Examples
///
/// ```
/// use detar_core::{ExtractConfig, OwnershipPolicy};
///
/// // Restore ownership when running as root, clear the umask
/// let config = ExtractConfig::default();
/// assert!(config.clear_umask);
///
/// let config = ExtractConfig::default()
///     .with_ownership(OwnershipPolicy::Never)
///     .with_clear_umask(false);
/// assert_eq!(config.ownership, OwnershipPolicy::Never);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractConfig {
    /// When to restore owner and group.
    pub ownership: OwnershipPolicy,

    /// Clear the process umask while extracting so created objects get
    /// exactly the archived mode.
    pub clear_umask: bool,
}

impl Default for ExtractConfig {
    /// Default values:
    /// - `ownership`: [`OwnershipPolicy::Auto`]
    /// - `clear_umask`: true
    fn default() -> Self {
        Self {
            ownership: OwnershipPolicy::Auto,
            clear_umask: true,
        }
    }
}

impl ExtractConfig {
    /// Sets the ownership policy.
    #[must_use]
    pub const fn with_ownership(mut self, ownership: OwnershipPolicy) -> Self {
        self.ownership = ownership;
        self
    }

    /// Sets whether the umask is cleared during extraction.
    #[must_use]
    pub const fn with_clear_umask(mut self, clear_umask: bool) -> Self {
        self.clear_umask = clear_umask;
        self
    }
}
