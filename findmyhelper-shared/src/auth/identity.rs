/// Federated identity token verification
///
/// The second authentication path: a client obtains an identity token from the
/// external provider and posts it to `/login`. We verify the signature,
/// issuer, audience, and expiry server-side (HS256, shared secret) and map the
/// claims onto a local user, creating one lazily on first login.
///
/// Federated accounts arrive with a verified email; the provider performed
/// that check before issuing the token.
///
/// # Example
///
/// ```no_run
/// use findmyhelper_shared::auth::identity::{IdentityConfig, verify_identity_token};
///
/// # fn example(token: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let config = IdentityConfig {
///     issuer: "https://id.example.com".to_string(),
///     audience: "findmyhelper".to_string(),
///     secret: "shared-verification-secret".to_string(),
/// };
///
/// let claims = verify_identity_token(token, &config)?;
/// println!("federated login for {}", claims.email);
/// # Ok(())
/// # }
/// ```
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Verification parameters for the external identity provider
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Expected `iss` claim
    pub issuer: String,

    /// Expected `aud` claim
    pub audience: String,

    /// HS256 verification secret shared with the provider
    pub secret: String,
}

/// Claims extracted from a verified identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Provider-side subject identifier
    pub sub: String,

    /// Verified email address
    pub email: String,

    /// Display name, when the provider supplies one
    #[serde(default)]
    pub name: Option<String>,

    pub iss: String,
    pub aud: String,
    pub exp: i64,
}

/// Error type for identity token verification
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity token expired")]
    Expired,

    #[error("invalid identity token: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for IdentityError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => IdentityError::Expired,
            _ => IdentityError::Invalid(err.to_string()),
        }
    }
}

/// Verifies an identity token and returns its claims
///
/// Checks signature, expiry, issuer, and audience. The claims are trusted only
/// after this returns `Ok`.
///
/// # Errors
///
/// `IdentityError::Expired` for expired tokens, `IdentityError::Invalid` for
/// anything else (bad signature, wrong issuer or audience, malformed token).
pub fn verify_identity_token(
    token: &str,
    config: &IdentityConfig,
) -> Result<IdentityClaims, IdentityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    let data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(data.claims)
}
