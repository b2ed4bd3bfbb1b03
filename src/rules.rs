//! Declarative validation rules
//!
//! A [`Rule`] pairs one form field with a predicate and the message shown
//! when the predicate fails. A [`RuleSet`] is an immutable, ordered sequence
//! of rules; declaration order is preserved through evaluation, which is what
//! keeps "first error shown" deterministic.
//!
//! Rule sets are built through [`RuleSetBuilder`], which declares the known
//! field names up front. A rule naming an unknown field is a configuration
//! error and fails construction immediately, so it can never surface as a
//! per-keystroke failure later.

use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

// Pragmatic email pattern: one `@`, non-empty local part, dot-separated
// domain. Server-side validation remains authoritative.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// Predicate evaluated against a single field value.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Errors raised while constructing a [`RuleSet`].
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
	#[error("rule {index} targets unknown field `{field}`")]
	UnknownField { index: usize, field: String },
	#[error("rule set declares no fields")]
	NoFields,
}

/// A single validation rule: one predicate plus its failure message,
/// attached to one field.
///
/// # Examples
///
/// ```
/// use rollcall_client::rules::Rule;
///
/// let rule = Rule::min_length("password", 8, "Password must be at least 8 characters.");
/// assert!(rule.passes("longenough"));
/// assert!(!rule.passes("short"));
/// ```
#[derive(Clone)]
pub struct Rule {
	field: String,
	message: String,
	predicate: Predicate,
	order: usize,
}

impl Rule {
	/// Creates a rule from an arbitrary predicate.
	pub fn new(
		field: impl Into<String>,
		message: impl Into<String>,
		predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
	) -> Self {
		Self {
			field: field.into(),
			message: message.into(),
			predicate: Arc::new(predicate),
			order: 0,
		}
	}

	/// Passes when the trimmed value is non-empty.
	pub fn required(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(field, message, |value| !value.trim().is_empty())
	}

	/// Passes when the value is strictly longer than `length` characters.
	pub fn longer_than(
		field: impl Into<String>,
		length: usize,
		message: impl Into<String>,
	) -> Self {
		Self::new(field, message, move |value| value.chars().count() > length)
	}

	/// Passes when the value is at least `length` characters long.
	pub fn min_length(
		field: impl Into<String>,
		length: usize,
		message: impl Into<String>,
	) -> Self {
		Self::new(field, message, move |value| {
			value.chars().count() >= length
		})
	}

	/// Passes when the value looks like an email address.
	pub fn email(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(field, message, |value| EMAIL_REGEX.is_match(value))
	}

	/// The field this rule targets.
	pub fn field(&self) -> &str {
		&self.field
	}

	/// The message surfaced when the predicate fails.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Position of this rule within its rule set's declaration order.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Evaluates the predicate against a field value.
	pub fn passes(&self, value: &str) -> bool {
		(self.predicate)(value)
	}
}

impl fmt::Debug for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Rule")
			.field("field", &self.field)
			.field("message", &self.message)
			.field("order", &self.order)
			.finish_non_exhaustive()
	}
}

/// Builder for [`RuleSet`]: declare the known field names, then attach rules.
///
/// # Examples
///
/// ```
/// use rollcall_client::rules::{Rule, RuleSet};
///
/// let rules = RuleSet::builder(["email"])
/// 	.rule(Rule::required("email", "Email is required."))
/// 	.build()
/// 	.unwrap();
/// assert_eq!(rules.len(), 1);
///
/// let bad = RuleSet::builder(["email"])
/// 	.rule(Rule::required("pasword", "typo"))
/// 	.build();
/// assert!(bad.is_err());
/// ```
pub struct RuleSetBuilder {
	fields: Vec<String>,
	rules: Vec<Rule>,
}

impl RuleSetBuilder {
	/// Appends a rule. Multiple rules may target the same field.
	pub fn rule(mut self, rule: Rule) -> Self {
		self.rules.push(rule);
		self
	}

	/// Finalizes the rule set, rejecting rules that name unknown fields.
	pub fn build(self) -> Result<RuleSet, RuleSetError> {
		if self.fields.is_empty() {
			return Err(RuleSetError::NoFields);
		}
		for (index, rule) in self.rules.iter().enumerate() {
			if !self.fields.iter().any(|field| field == rule.field()) {
				return Err(RuleSetError::UnknownField {
					index,
					field: rule.field().to_string(),
				});
			}
		}
		let mut rules = self.rules;
		for (order, rule) in rules.iter_mut().enumerate() {
			rule.order = order;
		}
		Ok(RuleSet {
			fields: self.fields,
			rules,
		})
	}
}

/// An immutable, ordered sequence of validation rules for one form type.
#[derive(Debug, Clone)]
pub struct RuleSet {
	fields: Vec<String>,
	rules: Vec<Rule>,
}

impl RuleSet {
	/// Starts a builder over the given field names.
	pub fn builder<I, S>(fields: I) -> RuleSetBuilder
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		RuleSetBuilder {
			fields: fields.into_iter().map(Into::into).collect(),
			rules: Vec::new(),
		}
	}

	/// Field names this rule set was declared over.
	pub fn fields(&self) -> &[String] {
		&self.fields
	}

	/// Rules in declaration order.
	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}

/// The canonical registration rules: username, email, and password
/// constraints in the order they are surfaced to the user.
pub fn register_rules() -> RuleSet {
	RuleSet::builder(["username", "email", "password"])
		.rule(Rule::longer_than(
			"username",
			5,
			"Username must be greater than 5 characters.",
		))
		.rule(Rule::longer_than(
			"email",
			5,
			"Email must be greater than 5 characters.",
		))
		.rule(Rule::email(
			"email",
			"Email must be a valid email address.",
		))
		.rule(Rule::min_length(
			"password",
			8,
			"Password must be at least 8 characters.",
		))
		.build()
		.expect("register rules are well-formed")
}

/// The canonical login rules: presence checks only.
pub fn login_rules() -> RuleSet {
	RuleSet::builder(["email", "password"])
		.rule(Rule::required("email", "Email is required."))
		.rule(Rule::required("password", "Password is required."))
		.build()
		.expect("login rules are well-formed")
}
