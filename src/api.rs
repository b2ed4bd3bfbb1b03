//! External users-service interface
//!
//! The remote API is a thin collaborator: this module carries its wire
//! shapes, the error taxonomy callers branch on, and the [`AuthApi`] seam
//! the session layer is injected with. The HTTP transport itself lives with
//! the host; any binding can share the decode helpers at the bottom of this
//! module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// `POST /auth/register` body. Registration carries the username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
	pub username: String,
	pub email: String,
	pub password: String,
}

/// `POST /auth/login` body. Login does not carry a username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

/// Successful auth response. `auth_token` is the field the session layer
/// persists; `status`/`message` are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
	pub status: String,
	pub message: String,
	pub auth_token: String,
}

/// One directory entry from `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: i64,
	pub username: String,
	pub email: String,
	#[serde(default)]
	pub active: bool,
}

#[derive(Debug, Deserialize)]
struct UsersEnvelope {
	data: UsersData,
}

#[derive(Debug, Deserialize)]
struct UsersData {
	users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
	message: String,
}

/// Errors reported by the collaborator.
///
/// `Domain` carries the server's own message text (for example
/// `"User does not exist."`) and is forwarded verbatim to the user.
/// `Transport` covers everything that never produced a domain answer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error("{0}")]
	Domain(String),
	#[error("transport error: {0}")]
	Transport(anyhow::Error),
}

impl ApiError {
	/// Wraps an arbitrary transport-layer failure.
	pub fn transport(err: impl Into<anyhow::Error>) -> Self {
		Self::Transport(err.into())
	}
}

/// The auth/users operations the session layer depends on.
///
/// Implementations are host-provided (HTTP, in-process fake, ...). All
/// methods are invoked from the single-threaded event flow; there is no
/// retry logic anywhere in this crate, a failed call is surfaced once.
#[async_trait]
pub trait AuthApi: Send + Sync {
	async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;
	async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;
	async fn list_users(&self) -> Result<Vec<User>, ApiError>;
}

/// Decodes a successful auth response body.
pub fn parse_auth_response(body: &str) -> Result<AuthResponse, ApiError> {
	serde_json::from_str(body).map_err(ApiError::transport)
}

/// Decodes the `{"data": {"users": [...]}}` envelope from `GET /users`.
pub fn parse_users_response(body: &str) -> Result<Vec<User>, ApiError> {
	let envelope: UsersEnvelope = serde_json::from_str(body).map_err(ApiError::transport)?;
	Ok(envelope.data.users)
}

/// Pulls the `message` field out of a `{"status": "fail", "message": ...}`
/// error body, if the body has that shape.
pub fn parse_error_message(body: &str) -> Option<String> {
	serde_json::from_str::<ErrorBody>(body)
		.ok()
		.map(|body| body.message)
}
