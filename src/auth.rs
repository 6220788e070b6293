//! Secrets, access rules, and consumer credential models.

pub mod credential;
pub mod rule;
pub mod secret;

pub use credential::*;
pub use rule::*;
pub use secret::*;
