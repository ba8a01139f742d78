//! Configuration for disposable instances.
//!
//! Configuration is chosen once, at construction, and never changes for the
//! lifetime of an instance. Types here use smart constructors so that an
//! invalid configuration cannot be built; [`DisposeConfig`] also
//! deserializes with defaults so it can live in an application's config file.

use nutype::nutype;
use serde::{Deserialize, Serialize};

/// Whether registration and teardown are serialized across threads.
///
/// The idempotence gate is atomic in both modes; this only decides whether a
/// [`LockZone`](crate::lock_zone::LockZone) is allocated to make dependent
/// registration mutually exclusive with a running teardown pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// No lock zone. Callers confine registration to one thread or
    /// synchronize externally.
    #[default]
    Unguarded,
    /// A lock zone serializes registration against teardown.
    Guarded,
}

impl ConcurrencyMode {
    /// Whether this mode allocates a lock zone.
    pub const fn is_guarded(self) -> bool {
        matches!(self, Self::Guarded)
    }
}

/// Maps a tri-state "thread safe?" preference onto a mode.
///
/// An unset preference behaves exactly like an explicit `false`.
impl From<Option<bool>> for ConcurrencyMode {
    fn from(preference: Option<bool>) -> Self {
        match preference {
            Some(true) => Self::Guarded,
            Some(false) | None => Self::Unguarded,
        }
    }
}

/// Human readable name of a disposable instance.
///
/// Labels appear in log fields and leak reports. They are trimmed and are
/// guaranteed to be non-empty and at most 255 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct ResourceLabel(String);

/// Construction-time settings for a [`Disposable`](crate::Disposable).
///
/// # Example
///
/// ```rust
/// use disposecore::config::{ConcurrencyMode, DisposeConfig};
///
/// let config: DisposeConfig = serde_json::from_str(
///     r#"{ "concurrency": "guarded", "label": "db-pool", "track": true }"#,
/// ).unwrap();
///
/// assert_eq!(config.concurrency, ConcurrencyMode::Guarded);
/// assert_eq!(config.label.unwrap().as_ref(), "db-pool");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisposeConfig {
    /// Concurrency mode, fixed for the instance's lifetime.
    pub concurrency: ConcurrencyMode,
    /// Optional name used in logs and leak reports.
    pub label: Option<ResourceLabel>,
    /// Register the instance with the global leak monitor.
    pub track: bool,
}

impl DisposeConfig {
    /// Configuration with the given concurrency mode and defaults otherwise.
    pub fn with_mode(concurrency: ConcurrencyMode) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    /// Switches to guarded mode.
    #[must_use]
    pub const fn guarded(mut self) -> Self {
        self.concurrency = ConcurrencyMode::Guarded;
        self
    }

    /// Names the instance.
    #[must_use]
    pub fn with_label(mut self, label: ResourceLabel) -> Self {
        self.label = Some(label);
        self
    }

    /// Enables leak tracking in the global monitor.
    #[must_use]
    pub const fn tracked(mut self) -> Self {
        self.track = true;
        self
    }
}
