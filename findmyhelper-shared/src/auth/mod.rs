/// Authentication primitives
///
/// - `password`: Argon2id hashing for local accounts
/// - `token`: opaque token generation (sessions, email verification)
/// - `identity`: federated identity token verification
pub mod identity;
pub mod password;
pub mod token;
