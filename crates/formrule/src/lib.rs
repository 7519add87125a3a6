//! # formrule
//!
//! Server-side validation of submitted form fields driven by compact rule
//! strings.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formrule::prelude::*;
//!
//! let mut form = FormValidator::new();
//! form.set_rule("name", "Name", "required|min_length[3]")
//!     .set_rule("email", "Email", "required|valid_email");
//!
//! form.run_validation(&Submission::post([("name", ""), ("email", "bad")]));
//! assert!(!form.form_success());
//! println!("{}", form.display_errors(None));
//! ```
//!
//! ## Rule strings
//!
//! A field's rules are `|`-separated tokens, each optionally carrying a
//! bracketed, comma-separated argument list: `required|max_length[20]`,
//! `not_equal[admin,post:username]`. See [`rules`] for the built-in set and
//! [`rules::RuleRegistry`] for adding more.
//!
//! ## Messages
//!
//! Every failing rule renders a template with `%1`, `%2`, ... placeholders.
//! Templates can be replaced globally or per field; see [`catalog`].
//!
//! ## One error per field
//!
//! The first rule that fails for a field decides its message. Later failures
//! on the same field are dropped.

pub mod callbacks;
pub mod catalog;
pub mod collector;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod parser;
pub mod prelude;
pub mod rules;
pub mod submission;

pub use config::{FormConfig, RuleSetDef};
pub use engine::{FormValidator, ValidationReport};
pub use error::{FormError, Result};
pub use submission::{Submission, SubmissionMethod};
