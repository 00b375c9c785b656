//! The `AUTO:SHIELDPROF` grant-list token: grammar, decoder, encoder and the
//! runtime hooks that turn its grants into character proficiencies.

pub mod attach;
pub mod decode;
pub mod encode;
pub mod error;
pub mod kind;
pub mod model;
pub mod runtime;
pub mod syntax;

pub use error::{EncodeError, GrantError};
pub use kind::{TokenKind, SHIELD_PROF};
pub use model::{DeferredListGrant, GrantOutcome, GrantPayload, GrantSpec};
pub use runtime::{apply_choices, attach, detach, granted_capabilities};
