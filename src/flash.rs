//! Flash notifications
//!
//! Transient, kind-tagged messages with explicit dismissal and timed
//! auto-expiry. At most one message per kind is visible at a time: showing a
//! new message of a kind replaces the previous one and cancels its timer.
//!
//! Every timed message owns an abortable expiry task; `dismiss` and
//! replacement abort it, so a stale timer can never fire against a message
//! that is no longer displayed. As a second line of defense, [`FlashMessages::visible`]
//! filters by deadline, so a message is observably gone by its TTL even when
//! the expiry task has not been polled yet.
//!
//! Showing a message spawns its expiry timer and therefore must happen inside
//! a tokio runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Nominal TTL observed for auto-expiring messages.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

/// Message kind, mapped to notification styling by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlashKind {
	Success,
	Danger,
}

/// A single notification.
///
/// `id` values are unique for the process lifetime. `ttl` of `None` means
/// the message stays until explicitly dismissed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashMessage {
	pub id: u64,
	pub kind: FlashKind,
	pub text: String,
	pub created_at: DateTime<Utc>,
	pub ttl: Option<Duration>,
	#[serde(skip)]
	expires_at: Option<Instant>,
}

impl FlashMessage {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|deadline| now >= deadline)
	}
}

#[derive(Default)]
struct FlashInner {
	messages: Vec<FlashMessage>,
	timers: HashMap<u64, AbortHandle>,
}

/// Manager for the visible notification queue.
///
/// Cheap to clone; clones share the same queue.
///
/// # Examples
///
/// ```
/// use rollcall_client::flash::{FlashKind, FlashMessages};
///
/// # tokio_test::block_on(async {
/// let flash = FlashMessages::new();
/// let id = flash.show(FlashKind::Success, "Welcome!");
/// assert_eq!(flash.visible().len(), 1);
///
/// assert!(flash.dismiss(id));
/// assert!(flash.visible().is_empty());
/// // Dismissing again is a no-op.
/// assert!(!flash.dismiss(id));
/// # });
/// ```
#[derive(Clone)]
pub struct FlashMessages {
	inner: Arc<Mutex<FlashInner>>,
	next_id: Arc<AtomicU64>,
	default_ttl: Duration,
}

impl FlashMessages {
	pub fn new() -> Self {
		Self::with_default_ttl(DEFAULT_TTL)
	}

	/// Overrides the TTL applied by [`FlashMessages::show`].
	pub fn with_default_ttl(default_ttl: Duration) -> Self {
		Self {
			inner: Arc::new(Mutex::new(FlashInner::default())),
			next_id: Arc::new(AtomicU64::new(0)),
			default_ttl,
		}
	}

	/// Shows a message with the default TTL, replacing any visible message
	/// of the same kind. Returns the new message's id.
	pub fn show(&self, kind: FlashKind, text: impl Into<String>) -> u64 {
		self.show_with_ttl(kind, text, Some(self.default_ttl))
	}

	/// Shows a message with an explicit TTL; `None` keeps it until
	/// dismissed.
	pub fn show_with_ttl(
		&self,
		kind: FlashKind,
		text: impl Into<String>,
		ttl: Option<Duration>,
	) -> u64 {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
		let now = Instant::now();
		let message = FlashMessage {
			id,
			kind,
			text: text.into(),
			created_at: Utc::now(),
			ttl,
			expires_at: ttl.map(|ttl| now + ttl),
		};

		let mut inner = self.inner.lock().unwrap();
		let FlashInner { messages, timers } = &mut *inner;
		// One visible message per kind: replace and cancel the old timer.
		messages.retain(|existing| {
			if existing.kind == kind {
				if let Some(handle) = timers.remove(&existing.id) {
					handle.abort();
				}
				false
			} else {
				true
			}
		});
		messages.push(message);

		if let Some(ttl) = ttl {
			let queue = Arc::clone(&self.inner);
			let task = tokio::spawn(async move {
				tokio::time::sleep(ttl).await;
				let mut inner = queue.lock().unwrap();
				// Guarded by id: only this exact message may be removed.
				inner.messages.retain(|message| message.id != id);
				inner.timers.remove(&id);
			});
			inner.timers.insert(id, task.abort_handle());
		}
		id
	}

	/// Removes a message immediately and cancels its pending expiry.
	/// Returns false when the id is not (or no longer) visible.
	pub fn dismiss(&self, id: u64) -> bool {
		let mut inner = self.inner.lock().unwrap();
		let before = inner.messages.len();
		inner.messages.retain(|message| message.id != id);
		if let Some(handle) = inner.timers.remove(&id) {
			handle.abort();
		}
		inner.messages.len() != before
	}

	/// The currently visible messages, oldest first. Messages past their
	/// deadline are purged here even if their expiry task has not run.
	pub fn visible(&self) -> Vec<FlashMessage> {
		let now = Instant::now();
		let mut inner = self.inner.lock().unwrap();
		let FlashInner { messages, timers } = &mut *inner;
		messages.retain(|message| {
			if message.is_expired(now) {
				timers.remove(&message.id);
				false
			} else {
				true
			}
		});
		messages.clone()
	}

	/// The visible message of one kind, if any.
	pub fn visible_of(&self, kind: FlashKind) -> Option<FlashMessage> {
		self.visible().into_iter().find(|message| message.kind == kind)
	}
}

impl Default for FlashMessages {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn ids_are_unique_and_monotonic() {
		let flash = FlashMessages::new();
		let first = flash.show(FlashKind::Success, "one");
		let second = flash.show(FlashKind::Danger, "two");
		assert!(second > first);
	}

	#[tokio::test]
	async fn new_message_of_same_kind_replaces_the_old_one() {
		let flash = FlashMessages::new();
		flash.show(FlashKind::Success, "first");
		flash.show(FlashKind::Success, "second");

		let visible = flash.visible();
		assert_eq!(visible.len(), 1);
		assert_eq!(visible[0].text, "second");
	}

	#[tokio::test]
	async fn success_and_danger_coexist() {
		let flash = FlashMessages::new();
		flash.show(FlashKind::Success, "Welcome!");
		flash.show(FlashKind::Danger, "User does not exist.");

		assert_eq!(flash.visible().len(), 2);
		assert_eq!(
			flash.visible_of(FlashKind::Success).unwrap().text,
			"Welcome!"
		);
		assert_eq!(
			flash.visible_of(FlashKind::Danger).unwrap().text,
			"User does not exist."
		);
	}

	#[tokio::test(start_paused = true)]
	async fn sticky_message_survives_past_the_default_ttl() {
		let flash = FlashMessages::new();
		flash.show_with_ttl(FlashKind::Danger, "stays", None);

		tokio::time::advance(Duration::from_secs(60)).await;
		tokio::task::yield_now().await;
		assert_eq!(flash.visible().len(), 1);
	}
}
