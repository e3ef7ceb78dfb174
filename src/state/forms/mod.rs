//! Form domain layer
//!
//! Typed field sets for the site's two email-verified forms.

mod field;
mod form_state;

pub use field::{FieldKind, FormField};
pub use form_state::{FormFocus, FormKind, VerifiedForm};
