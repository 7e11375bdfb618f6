//! Execution state of the host application.
//!
//! The platform adapter (lifecycle observer, timer, push handler) records transitions here; the
//! update applicator queries it to decide whether a payload may be merged into the live instance.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
	Foreground,
	/// The app is not presenting content; in-place merges are allowed.
	Background,
}

/// Source of the current execution state.
pub trait ExecutionContext: Send + Sync {
	fn state(&self) -> ExecutionState;

	fn is_background(&self) -> bool {
		self.state() == ExecutionState::Background
	}
}

/// Execution state updated by the lifecycle adapter.
#[derive(Debug)]
pub struct LifecycleState {
	state: AtomicU8,
}

const FOREGROUND: u8 = 0;
const BACKGROUND: u8 = 1;

impl LifecycleState {
	pub fn new(initial: ExecutionState) -> Self {
		Self {
			state: AtomicU8::new(Self::encode(initial)),
		}
	}

	pub fn set(&self, state: ExecutionState) {
		self.state.store(Self::encode(state), Ordering::SeqCst);
	}

	fn encode(state: ExecutionState) -> u8 {
		match state {
			ExecutionState::Foreground => FOREGROUND,
			ExecutionState::Background => BACKGROUND,
		}
	}
}

impl Default for LifecycleState {
	fn default() -> Self {
		Self::new(ExecutionState::Foreground)
	}
}

impl ExecutionContext for LifecycleState {
	fn state(&self) -> ExecutionState {
		match self.state.load(Ordering::SeqCst) {
			BACKGROUND => ExecutionState::Background,
			_ => ExecutionState::Foreground,
		}
	}
}
