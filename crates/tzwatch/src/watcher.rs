//! Time-zone watcher with async update streaming.
//!
//! This module provides the [`TzWatcher`] type: a persistent subscription to
//! updates of a time-zone symlink, backed by a background task that consumes
//! raw directory events, resolves the symlink on each relevant one, and
//! publishes the outcome on a pair of rendezvous channels.
//!
//! # Lifecycle
//!
//! 1. **Creation**: [`TzWatcher::new`] (or [`TzWatcher::from_path`])
//!    canonicalizes the directory portion of the path, registers a watch on
//!    the symlink's parent directory, and spawns the background event loop.
//!
//! 2. **Consumption**: drain [`TzWatcher::locations`] and
//!    [`TzWatcher::errors`] (or both at once via [`TzWatcher::channels`]).
//!    Publication blocks the loop until the value is received, so both
//!    channels must be consumed.
//!
//! 3. **Close**: [`TzWatcher::close`] unregisters the subscription; the loop
//!    observes the closed event stream, closes both output channels, and
//!    terminates. Dropping the watcher has the same effect.
//!
//! The directory, not the symlink itself, is watched: system tools replace
//! the link either by renaming a staged link over it or by removing and
//! recreating it, and a watch on the file handle would not survive either
//! sequence.

use std::any::Any;

use camino::{Utf8Path, Utf8PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::WatchError;
use crate::events::ZoneUpdate;
use crate::resolver::resolve_symlink;
use crate::source::{ChangeSource, DirEvent, NotifySource};

/// Well-known symlink naming the system-wide time zone on most Unix systems.
pub const LOCALTIME_PATH: &str = "/etc/localtime";

/// Capacity of the raw channel between the notification source and the
/// event loop.
const RAW_CHANNEL_CAPACITY: usize = 1;

/// A persistent subscription to time-zone updates.
///
/// Each watcher owns one canonical symlink path, one notification
/// subscription, and one background task that is the sole writer to the two
/// output channels. Watchers are independent: closing one does not affect
/// others watching the same or different paths.
///
/// # Delivery
///
/// Both output channels are rendezvous channels. An update is never
/// silently dropped; instead, an unread value stalls the background loop
/// until it is received. Consumers must keep draining both channels, or
/// hand the error channel off with [`TzWatcher::into_locations`].
///
/// # Ordering
///
/// Events are handled strictly in arrival order; resolution and publication
/// for one event complete before the next event is read. No consistency
/// with the live filesystem at an arbitrary instant is promised: by the
/// time a resolution runs, the link may have changed again, and the
/// published value reflects whatever the link pointed at when it was read.
///
/// # Examples
///
/// ```no_run
/// use tzwatch::TzWatcher;
///
/// # async fn example() -> Result<(), tzwatch::WatchError> {
/// let mut watcher = TzWatcher::from_path("/etc/localtime").await?;
///
/// let (locations, errors) = watcher.channels();
/// tokio::select! {
///     Some(update) = locations.recv() => println!("now {}", update.zone_id()),
///     Some(error) = errors.recv() => eprintln!("{error}"),
/// }
///
/// watcher.close();
/// # Ok(())
/// # }
/// ```
pub struct TzWatcher {
    /// Canonical path of the watched symlink, fixed at construction.
    path: Utf8PathBuf,

    /// Keeps the notification subscription registered.
    ///
    /// Dropping it unregisters interest and closes the raw event stream,
    /// which winds down the background task. Set to `None` by `close`.
    subscription: Option<Box<dyn Any + Send>>,

    /// Resolved updates published by the background task.
    locations: mpsc::Receiver<ZoneUpdate>,

    /// Failures published by the background task.
    errors: mpsc::Receiver<WatchError>,

    /// Handle to the background task.
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for TzWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TzWatcher")
            .field("path", &self.path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl TzWatcher {
    /// Subscribes to updates of the system-wide time zone.
    ///
    /// Equivalent to [`TzWatcher::from_path`] with [`LOCALTIME_PATH`].
    ///
    /// # Errors
    ///
    /// See [`TzWatcher::from_path`].
    pub async fn new() -> Result<Self, WatchError> {
        Self::from_path(LOCALTIME_PATH).await
    }

    /// Subscribes to updates of the symlink at `path`.
    ///
    /// The directory portion of `path` is canonicalized first: notification
    /// backends report paths relative to the real underlying directory, so
    /// events could never be matched against a path reached through a
    /// symlinked directory. The symlink itself is left unresolved; its
    /// target is what gets watched for.
    ///
    /// # Errors
    ///
    /// - [`WatchError::InvalidPath`] if `path` has no file name.
    /// - [`WatchError::Io`] if the parent directory cannot be
    ///   canonicalized.
    /// - [`WatchError::Notify`] if the notification backend refuses the
    ///   watch. No background task is started and no channels are created
    ///   in any of these cases.
    pub async fn from_path(path: impl AsRef<Utf8Path>) -> Result<Self, WatchError> {
        Self::with_source(path, NotifySource::new()).await
    }

    /// Subscribes using a caller-provided notification source.
    ///
    /// This is the seam for substituting an in-memory [`ChangeSource`] that
    /// synthesizes events deterministically.
    #[allow(clippy::unused_async)] // spawns onto the caller's runtime
    pub async fn with_source<S: ChangeSource>(
        path: impl AsRef<Utf8Path>,
        source: S,
    ) -> Result<Self, WatchError> {
        let path = canonical_watch_path(path.as_ref())?;
        let dir = path
            .parent()
            .ok_or_else(|| WatchError::invalid_path(path.clone(), "path has no parent directory"))?;

        let (raw_tx, raw_rx) = mpsc::channel(RAW_CHANNEL_CAPACITY);
        let subscription = source.subscribe(dir, raw_tx)?;

        let (location_tx, location_rx) = mpsc::channel(1);
        let (error_tx, error_rx) = mpsc::channel(1);
        let task = tokio::spawn(run_event_loop(path.clone(), raw_rx, location_tx, error_tx));

        Ok(Self {
            path,
            subscription: Some(Box::new(subscription)),
            locations: location_rx,
            errors: error_rx,
            task: Some(task),
        })
    }

    /// Channel of resolved time-zone updates.
    ///
    /// This channel must be consumed: an unread update blocks the
    /// background loop, and with it the delivery of errors and later
    /// updates. Yields `None` once the watcher is closed.
    pub fn locations(&mut self) -> &mut mpsc::Receiver<ZoneUpdate> {
        &mut self.locations
    }

    /// Channel of failures encountered while handling updates.
    ///
    /// Transient errors during replacement of the link are normal. This
    /// channel must be consumed just like [`TzWatcher::locations`]. Yields
    /// `None` once the watcher is closed.
    pub fn errors(&mut self) -> &mut mpsc::Receiver<WatchError> {
        &mut self.errors
    }

    /// Returns both output channels, split for use in one `tokio::select!`.
    pub fn channels(
        &mut self,
    ) -> (
        &mut mpsc::Receiver<ZoneUpdate>,
        &mut mpsc::Receiver<WatchError>,
    ) {
        (&mut self.locations, &mut self.errors)
    }

    /// Returns the canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns `true` while the subscription is registered and the
    /// background task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.subscription.is_some() && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Unsubscribes from updates.
    ///
    /// The background loop observes the closed event stream, publishes
    /// nothing further, and closes both output channels: subsequent reads
    /// on [`TzWatcher::locations`] and [`TzWatcher::errors`] yield `None`.
    /// Calling `close` again is a no-op.
    pub fn close(&mut self) {
        if self.subscription.take().is_some() {
            tracing::info!(path = %self.path, "time zone watcher closed");
        }
    }

    /// Consumes the watcher, returning only the location channel.
    ///
    /// A background task drains and discards everything delivered on the
    /// error channel, so the returned channel keeps flowing without the
    /// caller ever reading an error. Error visibility is lost entirely;
    /// consumers that care about failures should drain both channels
    /// instead. Dropping the returned receiver unsubscribes and winds the
    /// watcher down.
    #[must_use]
    pub fn into_locations(self) -> mpsc::Receiver<ZoneUpdate> {
        let Self {
            subscription,
            locations,
            mut errors,
            ..
        } = self;

        tokio::spawn(async move {
            // The subscription must outlive the error drain, or the raw
            // event stream would close as soon as the watcher is consumed.
            let _subscription = subscription;
            while errors.recv().await.is_some() {}
        });

        locations
    }
}

/// Runs the watcher's event loop: filter, resolve, publish.
///
/// The loop is the sole writer to both output channels. It terminates when
/// the raw event stream closes (the subscription was dropped) or when a
/// publication fails because the consumer dropped a receiver; both senders
/// are released on exit, closing the output channels exactly once.
async fn run_event_loop(
    path: Utf8PathBuf,
    mut raw: mpsc::Receiver<DirEvent>,
    locations: mpsc::Sender<ZoneUpdate>,
    errors: mpsc::Sender<WatchError>,
) {
    tracing::info!(path = %path, "time zone watcher started");

    while let Some(event) = raw.recv().await {
        if event.path != path {
            tracing::trace!(path = %event.path, "ignoring unrelated directory event");
            continue;
        }

        match resolve_symlink(&path) {
            Ok(update) => {
                if locations.send(update).await.is_err() {
                    break;
                }
            }
            Err(error) => {
                if errors.send(error).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::info!(path = %path, "time zone watcher stopped");
}

/// Canonicalizes the directory portion of `path` and rejoins the file name.
///
/// The file itself must stay unresolved: it is the symlink whose target the
/// watcher reports on.
fn canonical_watch_path(path: &Utf8Path) -> Result<Utf8PathBuf, WatchError> {
    let Some(file_name) = path.file_name() else {
        return Err(WatchError::invalid_path(
            path.to_owned(),
            "path has no file name",
        ));
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let dir = dir.canonicalize_utf8()?;

    Ok(dir.join(file_name))
}
