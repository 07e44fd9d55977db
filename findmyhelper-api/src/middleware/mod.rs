/// HTTP middleware
pub mod security;
pub mod session;
