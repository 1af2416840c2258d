//! [`Clock`] definitions.

use std::{fmt, sync::Arc};

use common::DateTime;

/// Source of the current [`DateTime`] for the service.
///
/// Commands never call [`DateTime::now()`] directly, so tests may pin the
/// clock to a fixed instant.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> DateTime + Send + Sync>);

impl Clock {
    /// Creates a new [`Clock`] reading the system time.
    #[must_use]
    pub fn system() -> Self {
        Self(Arc::new(DateTime::now))
    }

    /// Creates a new [`Clock`] always returning the provided [`DateTime`].
    #[must_use]
    pub fn fixed(at: DateTime) -> Self {
        Self(Arc::new(move || at))
    }

    /// Returns the current [`DateTime`] of this [`Clock`].
    #[must_use]
    pub fn now(&self) -> DateTime {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Clock").finish()
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::Clock;

    #[test]
    fn fixed_clock_never_moves() {
        let at = DateTime::from_rfc3339("2026-08-01T10:00:00Z").unwrap();
        let clock = Clock::fixed(at);

        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }
}
