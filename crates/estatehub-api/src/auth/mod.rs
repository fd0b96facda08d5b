// Session handling for the notification stream
// Sessions are issued by the marketplace app; this module only resolves them.

pub mod config;
pub mod jwt;
pub mod session;

pub use config::AuthConfig;
pub use jwt::JwtService;
pub use session::{JwtSessionResolver, Principal, SessionResolver};
