//! Authentication session management
//!
//! A two-state machine, `Anonymous` and `Authenticated`, backed by a single
//! persisted token slot. The token is the only durable shared resource: it
//! is read once at startup ([`SessionManager::restore`]) and written or
//! cleared only here.
//!
//! Completion handlers for in-flight auth calls are guarded by a generation
//! counter: [`SessionManager::logout`] bumps it, so a response landing after
//! the session has already changed is dropped instead of resurrecting a dead
//! session.

use crate::api::{ApiError, AuthApi, AuthResponse, LoginRequest, RegisterRequest, User};
use crate::flash::{FlashKind, FlashMessages};
use crate::settings::{ReauthPolicy, Settings, TransportErrorPolicy};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Success flash shown after login or registration.
pub const WELCOME_MESSAGE: &str = "Welcome!";

/// Generic danger flash for transport failures under
/// [`TransportErrorPolicy::Surface`].
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors from the token persistence slot.
#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
	#[error("token storage I/O: {0}")]
	Io(#[from] io::Error),
}

/// Minimal persistence capability for the auth token: one named slot.
///
/// Injected into [`SessionManager`] so tests can substitute
/// [`MemoryTokenStore`] for the host's durable storage.
pub trait TokenStore: Send + Sync {
	fn load(&self) -> Result<Option<String>, TokenStoreError>;
	fn store(&self, token: &str) -> Result<(), TokenStoreError>;
	fn clear(&self) -> Result<(), TokenStoreError>;
}

/// In-memory token slot.
#[derive(Default)]
pub struct MemoryTokenStore {
	slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl TokenStore for MemoryTokenStore {
	fn load(&self) -> Result<Option<String>, TokenStoreError> {
		Ok(self.slot.lock().unwrap().clone())
	}

	fn store(&self, token: &str) -> Result<(), TokenStoreError> {
		*self.slot.lock().unwrap() = Some(token.to_string());
		Ok(())
	}

	fn clear(&self) -> Result<(), TokenStoreError> {
		*self.slot.lock().unwrap() = None;
		Ok(())
	}
}

/// Token slot persisted as a single file, so the session survives a process
/// restart.
pub struct FileTokenStore {
	path: PathBuf,
}

impl FileTokenStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl TokenStore for FileTokenStore {
	fn load(&self) -> Result<Option<String>, TokenStoreError> {
		match fs::read_to_string(&self.path) {
			Ok(contents) => {
				let token = contents.trim();
				if token.is_empty() {
					Ok(None)
				} else {
					Ok(Some(token.to_string()))
				}
			}
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err.into()),
		}
	}

	fn store(&self, token: &str) -> Result<(), TokenStoreError> {
		fs::write(&self.path, token)?;
		Ok(())
	}

	fn clear(&self) -> Result<(), TokenStoreError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
			Err(err) => Err(err.into()),
		}
	}
}

/// Outcome of a login or registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
	/// The session is established (or was already, under
	/// [`ReauthPolicy::Ignore`]).
	Authenticated,
	/// The server rejected the attempt; its message was flashed verbatim.
	Rejected,
	/// The call never produced a domain answer.
	TransportFailed,
	/// The session changed while the call was outstanding; the result was
	/// dropped.
	Superseded,
}

enum AuthCall {
	Login(LoginRequest),
	Register(RegisterRequest),
}

struct SessionInner {
	token: Option<String>,
	generation: u64,
	users: Vec<User>,
}

/// Owns the session state machine and the persisted token slot.
pub struct SessionManager {
	api: Arc<dyn AuthApi>,
	store: Arc<dyn TokenStore>,
	flash: FlashMessages,
	settings: Settings,
	inner: Mutex<SessionInner>,
}

impl SessionManager {
	pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>, flash: FlashMessages) -> Self {
		Self::with_settings(api, store, flash, Settings::default())
	}

	pub fn with_settings(
		api: Arc<dyn AuthApi>,
		store: Arc<dyn TokenStore>,
		flash: FlashMessages,
		settings: Settings,
	) -> Self {
		Self {
			api,
			store,
			flash,
			settings,
			inner: Mutex::new(SessionInner {
				token: None,
				generation: 0,
				users: Vec::new(),
			}),
		}
	}

	/// Rebuilds the session from the persisted slot at process start.
	///
	/// Token content is not validated client-side; presence alone
	/// authenticates, the server stays the source of truth. Returns whether
	/// a session was restored.
	pub fn restore(&self) -> Result<bool, TokenStoreError> {
		let token = self.store.load()?;
		let restored = token.is_some();
		let mut inner = self.inner.lock().unwrap();
		inner.token = token;
		if restored {
			tracing::debug!("session restored from persisted token");
		}
		Ok(restored)
	}

	pub fn is_authenticated(&self) -> bool {
		self.inner.lock().unwrap().token.is_some()
	}

	/// The in-memory token; `Some` iff authenticated.
	pub fn token(&self) -> Option<String> {
		self.inner.lock().unwrap().token.clone()
	}

	/// The last users snapshot fetched after a successful auth call (or via
	/// [`SessionManager::refresh_users`]).
	pub fn users(&self) -> Vec<User> {
		self.inner.lock().unwrap().users.clone()
	}

	/// Attempts to establish a session with existing credentials.
	pub async fn login(&self, request: LoginRequest) -> AuthOutcome {
		self.authenticate(AuthCall::Login(request)).await
	}

	/// Attempts to register and establish a session in one step.
	pub async fn register(&self, request: RegisterRequest) -> AuthOutcome {
		self.authenticate(AuthCall::Register(request)).await
	}

	async fn authenticate(&self, call: AuthCall) -> AuthOutcome {
		let generation = {
			let inner = self.inner.lock().unwrap();
			if inner.token.is_some() {
				match self.settings.reauthentication {
					ReauthPolicy::Ignore => {
						tracing::debug!("already authenticated; attempt ignored");
						return AuthOutcome::Authenticated;
					}
					ReauthPolicy::Replace => {}
				}
			}
			inner.generation
		};

		let result = match &call {
			AuthCall::Login(request) => self.api.login(request).await,
			AuthCall::Register(request) => self.api.register(request).await,
		};

		match result {
			Ok(response) => self.complete_success(generation, response).await,
			Err(ApiError::Domain(message)) => {
				if !self.is_current(generation) {
					return AuthOutcome::Superseded;
				}
				tracing::debug!(reason = %message, "authentication rejected");
				self.flash.show(FlashKind::Danger, message);
				AuthOutcome::Rejected
			}
			Err(ApiError::Transport(err)) => {
				if !self.is_current(generation) {
					return AuthOutcome::Superseded;
				}
				tracing::error!(error = %err, "authentication transport failure");
				if self.settings.transport_errors == TransportErrorPolicy::Surface {
					self.flash.show(FlashKind::Danger, TRANSPORT_FAILURE_MESSAGE);
				}
				AuthOutcome::TransportFailed
			}
		}
	}

	async fn complete_success(&self, generation: u64, response: AuthResponse) -> AuthOutcome {
		{
			let mut inner = self.inner.lock().unwrap();
			if inner.generation != generation {
				tracing::warn!("dropping stale authentication result");
				return AuthOutcome::Superseded;
			}
			// Persist before the in-memory flip so no observer sees an
			// authenticated session without a durable token.
			if let Err(err) = self.store.store(&response.auth_token) {
				tracing::error!(error = %err, "failed to persist auth token");
			}
			inner.token = Some(response.auth_token);
		}
		tracing::debug!("session established");
		self.flash.show(FlashKind::Success, WELCOME_MESSAGE);
		self.refresh_users().await;
		AuthOutcome::Authenticated
	}

	/// Refreshes the cached users snapshot. List failures are logged only;
	/// the directory is decoration, not session state.
	pub async fn refresh_users(&self) {
		let generation = self.inner.lock().unwrap().generation;
		match self.api.list_users().await {
			Ok(users) => {
				let mut inner = self.inner.lock().unwrap();
				if inner.generation == generation {
					inner.users = users;
				}
			}
			Err(err) => tracing::warn!(error = %err, "failed to refresh users list"),
		}
	}

	/// Tears the session down: clears the persisted slot first, then the
	/// in-memory state, and invalidates any outstanding auth call.
	///
	/// Idempotent; a second call observes `Anonymous` and does nothing.
	pub fn logout(&self) -> Result<(), TokenStoreError> {
		self.store.clear()?;
		let mut inner = self.inner.lock().unwrap();
		inner.generation += 1;
		if inner.token.take().is_some() {
			tracing::debug!("session cleared");
		}
		Ok(())
	}

	fn is_current(&self, generation: u64) -> bool {
		self.inner.lock().unwrap().generation == generation
	}
}
