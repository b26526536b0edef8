//! Live subscription to changes of the system time zone.
//!
//! Most Unix systems express the configured time zone as a symlink
//! (conventionally `/etc/localtime`) pointing into the zone-info tree.
//! This crate watches that symlink and streams a resolved
//! [`chrono_tz::Tz`] to the consumer each time the link is replaced,
//! without polling.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                    Notify Callback Thread                      │
//! │  ┌──────────────────┐    ┌──────────────┐    ┌──────────────┐  │
//! │  │ RecommendedWatcher│ -> │ kind mapping │ -> │ blocking_send│  │
//! │  │ (parent dir)     │    │ (create/     │    │ (raw events) │  │
//! │  │                  │    │  rename/     │    │              │  │
//! │  └──────────────────┘    │  remove)     │    └──────┬───────┘  │
//! │                          └──────────────┘           │          │
//! └─────────────────────────────────────────────────────│──────────┘
//!                                                       ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                       │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │ event loop: path filter -> symlink resolution -> publish│   │
//! │  └───────────────┬──────────────────────────┬──────────────┘   │
//! │        locations │                   errors │                  │
//! │                  ▼                          ▼                  │
//! │          rendezvous channels drained by the consumer           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use tzwatch::TzWatcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut watcher = TzWatcher::new().await?;
//!
//!     let (locations, errors) = watcher.channels();
//!     loop {
//!         tokio::select! {
//!             Some(update) = locations.recv() => {
//!                 println!("system time zone is now {}", update.zone_id());
//!             }
//!             Some(error) = errors.recv() => {
//!                 eprintln!("transient failure: {error}");
//!             }
//!             else => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Consumers who accept losing error visibility can drain a single channel
//! instead:
//!
//! ```no_run
//! # async fn example() -> Result<(), tzwatch::WatchError> {
//! let watcher = tzwatch::TzWatcher::new().await?;
//! let mut locations = watcher.into_locations();
//! while let Some(update) = locations.recv().await {
//!     println!("{}", update.zone_id());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery contract
//!
//! Both output channels are rendezvous channels: publication blocks the
//! background loop until the consumer receives the value, so an update is
//! never silently dropped. The flip side is that a consumer which stops
//! draining either channel stalls the loop, and with it the watcher's
//! ability to observe further changes. Drain both channels, or use
//! [`TzWatcher::into_locations`] to have errors discarded on your behalf.
//!
//! # Error Handling
//!
//! All failures share the [`WatchError`] type. Construction failures are
//! returned synchronously; everything observed after construction arrives on
//! the error channel and never terminates the loop:
//!
//! ```
//! use tzwatch::WatchError;
//!
//! fn handle(error: &WatchError) {
//!     if error.is_transient() {
//!         // Mid-replacement hiccup; the next filesystem event retries.
//!         eprintln!("warning: {error}");
//!     } else {
//!         eprintln!("fatal: {error}");
//!     }
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod resolver;
pub mod source;
pub mod watcher;

// Re-export error types
pub use error::WatchError;

// Re-export event types
pub use events::ZoneUpdate;

// Re-export the resolver entry point
pub use resolver::resolve_symlink;

// Re-export notification source types
pub use source::{ChangeSource, DirEvent, DirEventKind, NotifySource};

// Re-export watcher types
pub use watcher::{TzWatcher, LOCALTIME_PATH};
