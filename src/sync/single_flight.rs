//! Single-flight guard: at most one sync attempt per content key.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Set of content keys with an attempt in flight.
///
/// A second attempt for a busy key is refused rather than queued.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
	in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Marks a key as busy until dropped, including when the owning future is cancelled.
#[derive(Debug)]
pub struct FlightGuard {
	key: String,
	in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SingleFlight {
	pub fn new() -> Self {
		Self::default()
	}

	/// Claim `key`, or `None` if another attempt holds it.
	pub fn try_acquire(&self, key: &str) -> Option<FlightGuard> {
		let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
		if !in_flight.insert(key.to_string()) {
			return None;
		}
		Some(FlightGuard {
			key: key.to_string(),
			in_flight: self.in_flight.clone(),
		})
	}
}

impl Drop for FlightGuard {
	fn drop(&mut self) {
		self.in_flight
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&self.key);
	}
}
