//! Crate configuration
//!
//! Three policy knobs, deserializable from a host-provided JSON document and
//! usable as plain defaults everywhere else. Unknown keys are tolerated so a
//! host config file can carry its own sections alongside these.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("invalid settings document: {0}")]
	Parse(#[from] serde_json::Error),
}

/// What to do when an auth call fails without a domain answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorPolicy {
	/// Flash a generic danger message.
	#[default]
	Surface,
	/// Log only, no user-visible feedback. Compatibility mode matching the
	/// original client's silent behavior.
	LogOnly,
}

/// What to do when login/register is requested while already authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReauthPolicy {
	/// Keep the existing session untouched; the attempt is a no-op.
	#[default]
	Ignore,
	/// Allow the attempt; a success replaces the session.
	Replace,
}

/// Client-core settings.
///
/// # Examples
///
/// ```
/// use rollcall_client::settings::{Settings, TransportErrorPolicy};
///
/// let settings = Settings::from_json(r#"{"flash_ttl_ms": 5000}"#).unwrap();
/// assert_eq!(settings.flash_ttl_ms, 5000);
/// assert_eq!(settings.transport_errors, TransportErrorPolicy::Surface);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Default flash-message lifetime in milliseconds.
	pub flash_ttl_ms: u64,
	pub transport_errors: TransportErrorPolicy,
	pub reauthentication: ReauthPolicy,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			flash_ttl_ms: 3000,
			transport_errors: TransportErrorPolicy::default(),
			reauthentication: ReauthPolicy::default(),
		}
	}
}

impl Settings {
	pub fn from_json(json: &str) -> Result<Self, SettingsError> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn flash_ttl(&self) -> Duration {
		Duration::from_millis(self.flash_ttl_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_observed_behavior() {
		let settings = Settings::default();
		assert_eq!(settings.flash_ttl(), Duration::from_millis(3000));
		assert_eq!(settings.transport_errors, TransportErrorPolicy::Surface);
		assert_eq!(settings.reauthentication, ReauthPolicy::Ignore);
	}

	#[test]
	fn json_overrides_and_unknown_keys() {
		let settings = Settings::from_json(
			r#"{
				"flash_ttl_ms": 1000,
				"transport_errors": "log_only",
				"reauthentication": "replace",
				"host_section": {"ignored": true}
			}"#,
		)
		.unwrap();
		assert_eq!(settings.flash_ttl_ms, 1000);
		assert_eq!(settings.transport_errors, TransportErrorPolicy::LogOnly);
		assert_eq!(settings.reauthentication, ReauthPolicy::Replace);
	}

	#[test]
	fn malformed_document_is_an_error() {
		assert!(Settings::from_json("{").is_err());
	}
}
