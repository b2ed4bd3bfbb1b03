//! Form state and controller
//!
//! [`FormState`] is the explicit, testable value/touched map for one mounted
//! form; [`FormController`] mediates between raw input events and the
//! validation engine, recomputing validity synchronously on every change and
//! gating submission. No rendering framework is involved anywhere here.

use crate::api::{LoginRequest, RegisterRequest};
use crate::engine::{self, ValidationResult};
use crate::rules::{login_rules, register_rules, RuleSet, RuleSetError};
use crate::session::{AuthOutcome, SessionManager};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One form field: current value plus the touched flag.
///
/// `touched` flips to true on the first edit and stays true until the form
/// is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
	name: String,
	value: String,
	touched: bool,
}

impl Field {
	fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: String::new(),
			touched: false,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	pub fn touched(&self) -> bool {
		self.touched
	}
}

/// Errors surfaced by [`FormState`] and [`FormController`] operations.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("unknown field `{0}`")]
	UnknownField(String),
	#[error("form is not valid")]
	NotValid,
	#[error("a submission is already in flight")]
	SubmitInFlight,
}

/// Mapping from field name to [`Field`] for one mounted form.
#[derive(Debug, Clone, Default)]
pub struct FormState {
	fields: HashMap<String, Field>,
}

impl FormState {
	/// Creates a state holding the given fields, all empty and untouched.
	pub fn with_fields<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let fields = names
			.into_iter()
			.map(Into::into)
			.map(|name| (name.clone(), Field::new(name)))
			.collect();
		Self { fields }
	}

	pub fn field(&self, name: &str) -> Option<&Field> {
		self.fields.get(name)
	}

	/// Current value of a field, if the field exists.
	pub fn value(&self, name: &str) -> Option<&str> {
		self.fields.get(name).map(Field::value)
	}

	/// Applies a user edit: stores the value and marks the field touched.
	pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
		let field = self
			.fields
			.get_mut(name)
			.ok_or_else(|| FormError::UnknownField(name.to_string()))?;
		field.value = value.into();
		field.touched = true;
		Ok(())
	}

	pub fn has_any_touched(&self) -> bool {
		self.fields.values().any(Field::touched)
	}

	/// Clears all values and touched flags, as on unmount/remount.
	pub fn reset(&mut self) {
		for field in self.fields.values_mut() {
			field.value.clear();
			field.touched = false;
		}
	}
}

/// The two form types the directory client ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormKind {
	Register,
	Login,
}

impl FormKind {
	pub fn field_names(&self) -> &'static [&'static str] {
		match self {
			FormKind::Register => &["username", "email", "password"],
			FormKind::Login => &["email", "password"],
		}
	}

	/// The canonical rule set for this form type.
	pub fn rules(&self) -> RuleSet {
		match self {
			FormKind::Register => register_rules(),
			FormKind::Login => login_rules(),
		}
	}

	/// Heading shown above the form.
	pub fn title(&self) -> &'static str {
		match self {
			FormKind::Register => "Register",
			FormKind::Login => "Log In",
		}
	}
}

/// Form-type-specific submission body. Registration carries the username;
/// login does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubmitPayload {
	Register(RegisterRequest),
	Login(LoginRequest),
}

struct FormInner {
	state: FormState,
	results: Vec<ValidationResult>,
	is_valid: bool,
}

/// Owns the state of one form instance and drives the validation engine.
///
/// Methods take `&self` so one controller can be shared with an event loop;
/// all mutation goes through the internal lock. Validity is recomputed
/// synchronously inside every [`FormController::on_field_change`], never
/// cached across edits.
///
/// # Examples
///
/// ```
/// use rollcall_client::form::{FormController, FormKind};
///
/// let form = FormController::new(FormKind::Login);
/// assert!(!form.can_submit());
///
/// form.on_field_change("email", "user@test.com").unwrap();
/// form.on_field_change("password", "greaterthanten").unwrap();
/// assert!(form.can_submit());
/// ```
pub struct FormController {
	kind: FormKind,
	rules: RuleSet,
	inner: Mutex<FormInner>,
	in_flight: AtomicBool,
}

impl FormController {
	/// Builds a controller with the canonical rules for `kind`.
	pub fn new(kind: FormKind) -> Self {
		Self::with_rules(kind, kind.rules()).expect("canonical rules match the form kind")
	}

	/// Builds a controller with a custom rule set.
	///
	/// Every rule must target one of the kind's fields; a mismatch is a
	/// configuration error reported here, once, not per keystroke.
	pub fn with_rules(kind: FormKind, rules: RuleSet) -> Result<Self, RuleSetError> {
		for (index, rule) in rules.rules().iter().enumerate() {
			if !kind.field_names().contains(&rule.field()) {
				return Err(RuleSetError::UnknownField {
					index,
					field: rule.field().to_string(),
				});
			}
		}
		let state = FormState::with_fields(kind.field_names().iter().copied());
		let results = engine::evaluate(&rules, &state);
		let is_valid = engine::is_satisfied(&rules, &state);
		Ok(Self {
			kind,
			rules,
			inner: Mutex::new(FormInner {
				state,
				results,
				is_valid,
			}),
			in_flight: AtomicBool::new(false),
		})
	}

	pub fn kind(&self) -> FormKind {
		self.kind
	}

	/// Applies a user edit and re-runs validation. No I/O happens here.
	pub fn on_field_change(&self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
		let mut inner = self.inner.lock().unwrap();
		inner.state.set(name, value)?;
		inner.results = engine::evaluate(&self.rules, &inner.state);
		inner.is_valid = engine::is_satisfied(&self.rules, &inner.state);
		Ok(())
	}

	/// Results of the latest evaluation pass, in rule declaration order.
	pub fn results(&self) -> Vec<ValidationResult> {
		self.inner.lock().unwrap().results.clone()
	}

	/// The first error of the latest pass, which is the one the UI surfaces.
	pub fn leading_error(&self) -> Option<ValidationResult> {
		let inner = self.inner.lock().unwrap();
		engine::leading_error(&inner.results).cloned()
	}

	pub fn is_valid(&self) -> bool {
		self.inner.lock().unwrap().is_valid
	}

	/// The sole submit gate: true iff every rule passes against current
	/// values. There is no "submit anyway" override.
	pub fn can_submit(&self) -> bool {
		self.is_valid()
	}

	pub fn has_any_touched(&self) -> bool {
		self.inner.lock().unwrap().state.has_any_touched()
	}

	/// Current value of a field ("" when absent, which cannot happen for
	/// fields of this kind).
	pub fn value(&self, name: &str) -> String {
		self.inner
			.lock()
			.unwrap()
			.state
			.value(name)
			.unwrap_or_default()
			.to_string()
	}

	/// Packages the current values into this kind's submission body.
	pub fn payload(&self) -> SubmitPayload {
		let inner = self.inner.lock().unwrap();
		let value = |name: &str| inner.state.value(name).unwrap_or_default().to_string();
		match self.kind {
			FormKind::Register => SubmitPayload::Register(RegisterRequest {
				username: value("username"),
				email: value("email"),
				password: value("password"),
			}),
			FormKind::Login => SubmitPayload::Login(LoginRequest {
				email: value("email"),
				password: value("password"),
			}),
		}
	}

	/// Clears values and touched flags.
	pub fn reset(&self) {
		let mut inner = self.inner.lock().unwrap();
		inner.state.reset();
		inner.results = engine::evaluate(&self.rules, &inner.state);
		inner.is_valid = engine::is_satisfied(&self.rules, &inner.state);
	}

	/// Delegates the current values to the session layer.
	///
	/// Rejected outright when the gate is closed, and while a previous
	/// submission is still outstanding (rapid repeated clicks must not fan
	/// out into parallel requests). On an authenticated outcome the form is
	/// cleared, matching the original post-success behavior.
	pub async fn submit(&self, session: &SessionManager) -> Result<AuthOutcome, FormError> {
		if !self.can_submit() {
			return Err(FormError::NotValid);
		}
		if self.in_flight.swap(true, Ordering::SeqCst) {
			return Err(FormError::SubmitInFlight);
		}
		let payload = self.payload();
		let outcome = match payload {
			SubmitPayload::Register(request) => session.register(request).await,
			SubmitPayload::Login(request) => session.login(request).await,
		};
		self.in_flight.store(false, Ordering::SeqCst);
		if outcome == AuthOutcome::Authenticated {
			self.reset();
		}
		Ok(outcome)
	}
}
