//! Latest-wins sequencing of data reloads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one reload request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReloadToken(u64);

/// Hands out monotonically increasing tokens; only the most recently issued
/// one may apply its result.
#[derive(Clone, Debug, Default)]
pub struct ReloadSequencer {
	latest: Arc<AtomicU64>,
}

impl ReloadSequencer {
	/// Creates a sequencer with no reload issued.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a reload, superseding every earlier one.
	pub fn begin(&self) -> ReloadToken {
		ReloadToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
	}

	/// The most recently issued token.
	pub fn latest(&self) -> ReloadToken {
		ReloadToken(self.latest.load(Ordering::SeqCst))
	}

	/// True iff no newer reload has started since `token` was issued.
	pub fn is_current(&self, token: ReloadToken) -> bool {
		self.latest.load(Ordering::SeqCst) == token.0
	}
}
