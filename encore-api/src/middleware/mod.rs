pub mod auth;

pub use auth::{admin_auth_middleware, auth_middleware, claims_from_headers, Claims};
