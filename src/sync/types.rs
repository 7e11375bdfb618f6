use crate::remote::{RemoteError, Validator};

use std::fmt;
use std::time::Duration;

/// Error types for a sync attempt.
///
/// None of these escape to the application: the engine folds them into
/// [`SyncOutcome::Failed`] and the next trigger starts again from scratch.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
	#[error("Config missing: {0}")]
	ConfigMissing(String),

	#[error("Transport failure: {0}")]
	TransportFailure(#[from] RemoteError),

	#[error("Malformed payload: {0}")]
	MalformedPayload(String),

	#[error("Storage failure: {0}")]
	StorageFailure(String),

	#[error("Serialization failure: {0}")]
	SerializationFailure(String),

	#[error("Sync budget of {0:?} expired")]
	BudgetExpired(Duration),
}

/// What a sync attempt decided to do after probing the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
	/// Local state already reflects the server.
	NoChange,
	/// The server has content newer than the snapshot on disk.
	FetchAndApply,
	/// The snapshot on disk is current but was never merged into the live object.
	ReuseSnapshotAndApply,
}

impl fmt::Display for SyncDecision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SyncDecision::NoChange => "no-change",
			SyncDecision::FetchAndApply => "fetch-and-apply",
			SyncDecision::ReuseSnapshotAndApply => "reuse-snapshot-and-apply",
		};
		f.write_str(name)
	}
}

/// What the update applicator managed to do with one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
	/// A new snapshot was written and `saved` advanced.
	pub persisted: bool,
	/// The payload was merged into the live instance.
	pub live_merged: bool,
	/// `applied` was advanced to the payload's validator.
	pub applied_recorded: bool,
}

/// Result of one sync attempt.
#[derive(Debug)]
pub enum SyncOutcome {
	NoChange,
	Applied {
		decision: SyncDecision,
		validator: Option<Validator>,
		report: ApplyReport,
	},
	/// The snapshot at `validator` is current but the live merge has to wait for a background
	/// trigger. Nothing was read or written.
	Deferred { validator: Option<Validator> },
	/// Another attempt for the same content key was already running.
	Busy,
	Failed(SyncError),
}

impl SyncOutcome {
	pub fn is_failure(&self) -> bool {
		matches!(self, SyncOutcome::Failed(_))
	}
}
