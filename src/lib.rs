//! Client-side engine for the Rollcall user directory
//!
//! Rollcall's pages (register, log in, the users list) are thin shells over
//! this crate: a declarative form-validation engine, a persisted
//! authentication session, and a flash-notification queue, all independent
//! of any rendering framework so every behavior is unit-testable.
//!
//! - [`rules`]: declarative, order-preserving validation rules per form type
//! - [`engine`]: pure tri-state evaluation of a rule set against form state
//! - [`form`]: field/touched state, submit gating, and submission payloads
//! - [`session`]: the `Anonymous`/`Authenticated` state machine and the
//!   persisted token slot
//! - [`flash`]: kind-tagged notifications with dismissal and timed expiry
//! - [`api`]: wire shapes and the trait seam for the remote users service
//! - [`settings`]: the crate's policy knobs
//!
//! Control flow: an input event reaches [`form::FormController::on_field_change`],
//! validity is recomputed synchronously, and the UI reads back tri-state
//! results and the submit gate. A submit delegates to
//! [`session::SessionManager`], which persists the token, raises flash
//! messages, and refreshes the users snapshot.

pub mod api;
pub mod engine;
pub mod flash;
pub mod form;
pub mod rules;
pub mod session;
pub mod settings;

pub use api::{
	ApiError, AuthApi, AuthResponse, LoginRequest, RegisterRequest, User, parse_auth_response,
	parse_error_message, parse_users_response,
};
pub use engine::{RuleState, ValidationResult, evaluate, is_satisfied, leading_error};
pub use flash::{DEFAULT_TTL, FlashKind, FlashMessage, FlashMessages};
pub use form::{Field, FormController, FormError, FormKind, FormState, SubmitPayload};
pub use rules::{
	Predicate, Rule, RuleSet, RuleSetBuilder, RuleSetError, login_rules, register_rules,
};
pub use session::{
	AuthOutcome, FileTokenStore, MemoryTokenStore, SessionManager, TRANSPORT_FAILURE_MESSAGE,
	TokenStore, TokenStoreError, WELCOME_MESSAGE,
};
pub use settings::{ReauthPolicy, Settings, SettingsError, TransportErrorPolicy};
