//! Authentication primitives: credentials, registration payloads, and the
//! caller identity attached to authorised requests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, Role, UserId, UserValidationError, Username};
use super::{Error, ErrorCode};

/// Minimum allowed password length.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Username failed identity validation.
    Username(UserValidationError),
    /// Email failed identity validation.
    Email(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`] characters.
    PasswordTooShort { min: usize },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(err) | Self::Email(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

fn validate_password(password: &str) -> Result<(), CredentialValidationError> {
    if password.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(())
}

/// Validated registration payload.
///
/// ## Invariants
/// - `username` and `email` satisfy the identity rules in [`super::user`].
/// - `password` is at least [`PASSWORD_MIN`] characters and retains
///   caller-provided whitespace to avoid surprising credential comparisons.
#[derive(Debug, Clone)]
pub struct RegistrationDetails {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl RegistrationDetails {
    /// Construct registration details from raw inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let username = Username::new(username).map_err(CredentialValidationError::Username)?;
        let email = EmailAddress::new(email).map_err(CredentialValidationError::Email)?;
        validate_password(password)?;
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested unique handle.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext secret; hashed before it ever reaches a store.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated login credentials.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    ///
    /// The password is only checked for non-emptiness here: length rules
    /// apply at registration, and rejecting short login attempts early would
    /// leak which rule the stored credential was created under.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::new(email).map_err(CredentialValidationError::Email)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Identity attached to a request once its bearer token has been verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    subject: UserId,
    role: Role,
}

impl CallerContext {
    /// Build a caller context from verified token claims.
    pub fn new(subject: UserId, role: Role) -> Self {
        Self { subject, role }
    }

    /// Authenticated user id.
    pub fn subject(&self) -> &UserId {
        &self.subject
    }

    /// Role carried by the verified token.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Central capability check: fail with [`ErrorCode::Forbidden`] unless
    /// the caller holds `required`.
    pub fn require_role(&self, required: Role) -> Result<(), Error> {
        if self.role == required {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "{} access required",
                required.as_str()
            )))
        }
    }
}
