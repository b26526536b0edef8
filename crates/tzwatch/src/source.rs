//! Raw directory change notifications and the capability that produces them.
//!
//! The watcher never talks to the OS notification mechanism directly; it
//! consumes [`DirEvent`]s from a [`ChangeSource`]. The production source is
//! [`NotifySource`], backed by the `notify` crate. Tests substitute an
//! in-memory source that synthesizes create/rename/remove events
//! deterministically.

use camino::{Utf8Path, Utf8PathBuf};
use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::WatchError;

/// The kind of directory change the watcher subscribes to.
///
/// Symlinks are commonly replaced either by creating a new link and renaming
/// it over the old one, or by removing the old link and creating a new one.
/// These three kinds cover both sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEventKind {
    /// An entry appeared in the directory.
    Create,
    /// An entry was renamed (either name involved in the rename).
    Rename,
    /// An entry was removed from the directory.
    Remove,
}

/// A raw change observed in a watched directory.
///
/// Ephemeral: the watcher reacts to it and discards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEvent {
    /// The affected path, as reported by the backend.
    pub path: Utf8PathBuf,
    /// What happened to the path.
    pub kind: DirEventKind,
}

/// A capability that delivers directory change events.
///
/// `subscribe` registers interest in create/rename/remove events under
/// `dir` and forwards each observed change into `events`. The returned
/// subscription guard keeps the registration alive; dropping it unregisters
/// interest and closes the stream (the `events` sender is released, so the
/// receiving side observes end-of-stream).
pub trait ChangeSource {
    /// Handle that keeps the subscription registered for its lifetime.
    type Subscription: Send + 'static;

    /// Registers interest in changes under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot register the watch; no events
    /// are delivered in that case.
    fn subscribe(
        self,
        dir: &Utf8Path,
        events: mpsc::Sender<DirEvent>,
    ) -> Result<Self::Subscription, WatchError>;
}

/// The production [`ChangeSource`], backed by [`notify`].
///
/// Watches the directory non-recursively and forwards create, rename, and
/// remove events from the notify callback thread into the async channel.
/// Backend errors and non-UTF-8 paths are logged and skipped; they carry no
/// information about the watched symlink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifySource;

impl NotifySource {
    /// Creates a new notify-backed source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ChangeSource for NotifySource {
    type Subscription = RecommendedWatcher;

    fn subscribe(
        self,
        dir: &Utf8Path,
        events: mpsc::Sender<DirEvent>,
    ) -> Result<Self::Subscription, WatchError> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let event = match res {
                Ok(event) => event,
                Err(error) => {
                    tracing::warn!(error = %error, "notify backend error");
                    return;
                }
            };

            let Some(kind) = dir_event_kind(&event.kind) else {
                return;
            };

            for path in event.paths {
                let path = match Utf8PathBuf::try_from(path) {
                    Ok(path) => path,
                    Err(error) => {
                        let invalid_path = error.into_path_buf();
                        tracing::warn!(
                            path = %invalid_path.display(),
                            "skipping non-UTF-8 path in directory event"
                        );
                        continue;
                    }
                };

                // blocking_send is safe here: the callback runs on notify's
                // own thread, not inside the async runtime.
                if events.blocking_send(DirEvent { path, kind }).is_err() {
                    tracing::debug!("event channel closed, stopping notify forwarding");
                    return;
                }
            }
        })?;

        watcher.watch(dir.as_std_path(), RecursiveMode::NonRecursive)?;

        Ok(watcher)
    }
}

/// Maps a notify event kind to the subset the watcher subscribes to.
fn dir_event_kind(kind: &EventKind) -> Option<DirEventKind> {
    match kind {
        EventKind::Create(_) => Some(DirEventKind::Create),
        EventKind::Modify(ModifyKind::Name(_)) => Some(DirEventKind::Rename),
        EventKind::Remove(_) => Some(DirEventKind::Remove),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, MetadataKind, RemoveKind, RenameMode};

    #[test]
    fn test_kind_mapping_covers_the_subscription_mask() {
        assert_eq!(
            dir_event_kind(&EventKind::Create(CreateKind::Any)),
            Some(DirEventKind::Create)
        );
        assert_eq!(
            dir_event_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            Some(DirEventKind::Rename)
        );
        assert_eq!(
            dir_event_kind(&EventKind::Remove(RemoveKind::Any)),
            Some(DirEventKind::Remove)
        );
    }

    #[test]
    fn test_kind_mapping_ignores_other_events() {
        assert_eq!(dir_event_kind(&EventKind::Any), None);
        assert_eq!(
            dir_event_kind(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))),
            None
        );
        assert_eq!(dir_event_kind(&EventKind::Access(notify::event::AccessKind::Any)), None);
    }
}
