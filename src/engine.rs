//! Validation engine
//!
//! Pure evaluation of a [`RuleSet`] against a [`FormState`]. The engine is
//! re-run on every keystroke, so it performs no I/O and has no side effects:
//! identical inputs always yield the identical result sequence, in rule
//! declaration order.

use crate::form::FormState;
use crate::rules::RuleSet;
use serde::{Deserialize, Serialize};

/// Tri-state feedback for a single rule.
///
/// Untouched fields report [`RuleState::Pending`] regardless of the predicate
/// outcome, so an empty form never opens covered in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleState {
	Pending,
	Error,
	Success,
}

/// Outcome of one rule in one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
	pub field: String,
	pub message: String,
	pub state: RuleState,
}

/// Evaluates every rule, in declaration order, against the current values.
///
/// A rule whose field is missing from the form state evaluates as a
/// never-satisfied failure; [`crate::form::FormController`] construction
/// rejects such configurations, so hitting that path means the rule set and
/// state were assembled by hand.
///
/// # Examples
///
/// ```
/// use rollcall_client::engine::{evaluate, RuleState};
/// use rollcall_client::form::FormState;
/// use rollcall_client::rules::login_rules;
///
/// let rules = login_rules();
/// let mut form = FormState::with_fields(["email", "password"]);
///
/// // Nothing touched yet: all results are pending.
/// assert!(evaluate(&rules, &form).iter().all(|r| r.state == RuleState::Pending));
///
/// form.set("email", "user@test.com").unwrap();
/// let results = evaluate(&rules, &form);
/// assert_eq!(results[0].state, RuleState::Success);
/// assert_eq!(results[1].state, RuleState::Pending);
/// ```
pub fn evaluate(rules: &RuleSet, form: &FormState) -> Vec<ValidationResult> {
	rules
		.rules()
		.iter()
		.map(|rule| {
			let state = match form.field(rule.field()) {
				Some(field) => {
					if !field.touched() {
						RuleState::Pending
					} else if rule.passes(field.value()) {
						RuleState::Success
					} else {
						RuleState::Error
					}
				}
				None => {
					tracing::warn!(
						field = rule.field(),
						"rule targets a field missing from the form state"
					);
					RuleState::Error
				}
			};
			ValidationResult {
				field: rule.field().to_string(),
				message: rule.message().to_string(),
				state,
			}
		})
		.collect()
}

/// True iff every rule's predicate passes against the current values,
/// ignoring touched state. This is the submit gate.
pub fn is_satisfied(rules: &RuleSet, form: &FormState) -> bool {
	rules.rules().iter().all(|rule| {
		form.field(rule.field())
			.is_some_and(|field| rule.passes(field.value()))
	})
}

/// First error in declaration order, if any.
pub fn leading_error(results: &[ValidationResult]) -> Option<&ValidationResult> {
	results.iter().find(|result| result.state == RuleState::Error)
}
