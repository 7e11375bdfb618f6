//! Client-side synchronization of a remotely published content document.
//!
//! The crate keeps a strongly typed content object in step with a versioned JSON document served
//! over HTTP. A cheap `HEAD` probe compares the server's validator with two locally persisted
//! validators (`saved` for the snapshot on disk, `applied` for the live object) and only downloads
//! when the server has something new. Downloads are persisted as whole-file snapshots and merged
//! into the live object field by field.
//!
//! ```no_run
//! use coppy_sync::{AppIdentity, Coppy, ContentDocument, MergeableContent, ResolverSettings, SyncSettings, merge_field};
//! use serde::Serialize;
//!
//! #[derive(Default, Serialize)]
//! struct Strings {
//! 	title: String,
//! }
//!
//! impl MergeableContent for Strings {
//! 	fn merge_fields(&mut self, updates: &ContentDocument) {
//! 		merge_field(&mut self.title, updates, "title");
//! 	}
//! }
//!
//! # async fn run() -> Result<(), coppy_sync::SyncError> {
//! let coppy = Coppy::<Strings>::initialize(
//! 	&AppIdentity::new("my-site", "42"),
//! 	&ResolverSettings::new("/var/lib/my-app"),
//! 	SyncSettings::default(),
//! )
//! .await?;
//!
//! let content = coppy.content().await;
//! println!("{}", content.read().unwrap().title);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content;
mod coppy;
pub mod remote;
pub mod store;
pub mod sync;
mod utils;

pub use config::{AppIdentity, ApplyPolicy, CoppyConfig, ResolverSettings, SyncSettings, resolve};
pub use content::{
	ContentDocument, ContentRegistry, MergeableContent, SharedContent, merge_field, parse_document,
};
pub use coppy::Coppy;
pub use remote::{ContentSource, FetchedContent, HttpContentSource, RemoteError, Validator};
pub use store::{
	FileSnapshotStore, FileValidatorStore, MemoryValidatorStore, SnapshotStore, ValidatorStore,
};
pub use sync::{
	ApplyReport, ExecutionContext, ExecutionState, LifecycleState, SyncDecision, SyncEngine,
	SyncError, SyncEvent, SyncEventHandler, SyncOutcome, decide,
};
