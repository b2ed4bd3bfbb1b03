//! Shared test fixtures
//!
//! A programmable stand-in for the remote users service plus a builder for
//! the session stack. Latency is simulated with tokio timers so race tests
//! can interleave events under a paused clock.

#![allow(dead_code)]

use async_trait::async_trait;
use rollcall_client::api::{
	ApiError, AuthApi, AuthResponse, LoginRequest, RegisterRequest, User,
};
use rollcall_client::flash::FlashMessages;
use rollcall_client::session::{MemoryTokenStore, SessionManager, TokenStore};
use rollcall_client::settings::Settings;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake service answers to auth calls.
pub enum AuthBehavior {
	Accept { token: String },
	Reject { message: String },
	TransportFail,
}

pub struct FakeAuthApi {
	behavior: Mutex<AuthBehavior>,
	latency: Duration,
	auth_calls: AtomicUsize,
	users: Mutex<Vec<User>>,
	last_register: Mutex<Option<RegisterRequest>>,
}

impl FakeAuthApi {
	pub fn accepting(token: &str) -> Self {
		Self::with_behavior(AuthBehavior::Accept {
			token: token.to_string(),
		})
	}

	pub fn rejecting(message: &str) -> Self {
		Self::with_behavior(AuthBehavior::Reject {
			message: message.to_string(),
		})
	}

	pub fn transport_failing() -> Self {
		Self::with_behavior(AuthBehavior::TransportFail)
	}

	pub fn with_behavior(behavior: AuthBehavior) -> Self {
		Self {
			behavior: Mutex::new(behavior),
			latency: Duration::ZERO,
			auth_calls: AtomicUsize::new(0),
			users: Mutex::new(vec![User {
				id: 1,
				username: "michael".into(),
				email: "michael@test.com".into(),
				active: true,
			}]),
			last_register: Mutex::new(None),
		}
	}

	/// Delays every auth answer, so a test can act while a call is
	/// outstanding.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = latency;
		self
	}

	pub fn auth_calls(&self) -> usize {
		self.auth_calls.load(Ordering::SeqCst)
	}

	pub fn last_register(&self) -> Option<RegisterRequest> {
		self.last_register.lock().unwrap().clone()
	}

	async fn answer(&self) -> Result<AuthResponse, ApiError> {
		self.auth_calls.fetch_add(1, Ordering::SeqCst);
		if !self.latency.is_zero() {
			tokio::time::sleep(self.latency).await;
		}
		match &*self.behavior.lock().unwrap() {
			AuthBehavior::Accept { token } => Ok(AuthResponse {
				status: "success".into(),
				message: "Successfully logged in.".into(),
				auth_token: token.clone(),
			}),
			AuthBehavior::Reject { message } => Err(ApiError::Domain(message.clone())),
			AuthBehavior::TransportFail => {
				Err(ApiError::transport(std::io::Error::other("connection refused")))
			}
		}
	}
}

#[async_trait]
impl AuthApi for FakeAuthApi {
	async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
		*self.last_register.lock().unwrap() = Some(request.clone());
		self.answer().await
	}

	async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, ApiError> {
		self.answer().await
	}

	async fn list_users(&self) -> Result<Vec<User>, ApiError> {
		Ok(self.users.lock().unwrap().clone())
	}
}

/// A fully wired session stack over fakes.
pub struct Stack {
	pub api: Arc<FakeAuthApi>,
	pub store: Arc<MemoryTokenStore>,
	pub flash: FlashMessages,
	pub session: Arc<SessionManager>,
}

pub fn stack(api: FakeAuthApi) -> Stack {
	stack_with_settings(api, Settings::default())
}

pub fn stack_with_settings(api: FakeAuthApi, settings: Settings) -> Stack {
	let api = Arc::new(api);
	let store = Arc::new(MemoryTokenStore::new());
	let flash = FlashMessages::with_default_ttl(settings.flash_ttl());
	let session = Arc::new(SessionManager::with_settings(
		Arc::clone(&api) as Arc<dyn AuthApi>,
		Arc::clone(&store) as Arc<dyn TokenStore>,
		flash.clone(),
		settings,
	));
	Stack {
		api,
		store,
		flash,
		session,
	}
}

pub fn login_request(email: &str, password: &str) -> LoginRequest {
	LoginRequest {
		email: email.to_string(),
		password: password.to_string(),
	}
}
