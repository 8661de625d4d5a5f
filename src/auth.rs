//! Session authentication: password hashing, the session layer, and the
//! extractors that gate handlers on the signed-in user.

pub mod extract;
pub mod password;
pub mod session;

pub use extract::{CurrentUser, RequireAuth, RequireStaff};
