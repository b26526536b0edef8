//! Resolved time-zone values delivered to consumers.

use std::time::Instant;

use chrono_tz::Tz;

/// A resolved time-zone update.
///
/// Produced each time the watched symlink is observed to change and its
/// target resolves to a known zone. Immutable once produced; ownership
/// transfers to the consumer on delivery.
///
/// # Examples
///
/// ```
/// use tzwatch::ZoneUpdate;
///
/// let update = ZoneUpdate::new(chrono_tz::America::New_York);
/// assert_eq!(update.zone_id(), "America/New_York");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneUpdate {
    /// The loaded time zone the symlink currently points at.
    pub zone: Tz,

    /// The timestamp when this update was produced.
    ///
    /// Uses [`Instant`] for monotonic timing, suitable for measuring
    /// elapsed time but not for wall-clock display.
    pub timestamp: Instant,
}

impl ZoneUpdate {
    /// Creates a new update for the given zone.
    ///
    /// The timestamp is set to the current instant.
    #[inline]
    #[must_use]
    pub fn new(zone: Tz) -> Self {
        Self {
            zone,
            timestamp: Instant::now(),
        }
    }

    /// Creates a new update with a specific timestamp.
    ///
    /// Useful for testing or when reconstructing updates.
    #[inline]
    #[must_use]
    pub const fn with_timestamp(zone: Tz, timestamp: Instant) -> Self {
        Self { zone, timestamp }
    }

    /// Returns the IANA identifier of the zone, e.g. `America/New_York`.
    #[inline]
    #[must_use]
    pub fn zone_id(&self) -> &'static str {
        self.zone.name()
    }

    /// Returns the region portion of the identifier, if it has one.
    ///
    /// # Examples
    ///
    /// ```
    /// use tzwatch::ZoneUpdate;
    ///
    /// let update = ZoneUpdate::new(chrono_tz::Europe::Berlin);
    /// assert_eq!(update.region(), Some("Europe"));
    ///
    /// let bare = ZoneUpdate::new(chrono_tz::UTC);
    /// assert_eq!(bare.region(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn region(&self) -> Option<&'static str> {
        self.zone_id().split_once('/').map(|(region, _)| region)
    }

    /// Returns the city portion of the identifier, if it has one.
    ///
    /// For three-segment identifiers this is the final segment.
    #[inline]
    #[must_use]
    pub fn city(&self) -> Option<&'static str> {
        self.zone_id().rsplit_once('/').map(|(_, city)| city)
    }
}
