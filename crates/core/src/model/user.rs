use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("email address is not valid")]
    InvalidEmail,

    #[error("name cannot be empty")]
    EmptyName,
}

/// Public profile of a learner account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
}

impl User {
    /// # Errors
    ///
    /// Returns `UserError` if the email has no `@` with text on both sides or
    /// the name is blank.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        avatar: Option<String>,
    ) -> Result<Self, UserError> {
        let email = normalize_email(&email.into())?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserError::EmptyName);
        }

        Ok(Self {
            id,
            email,
            name: name.trim().to_owned(),
            avatar: avatar
                .map(|a| a.trim().to_owned())
                .filter(|a| !a.is_empty()),
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }
}

/// Lower-cases and trims an email, rejecting obviously malformed input.
///
/// # Errors
///
/// Returns `UserError::InvalidEmail` when there is no local part or domain.
pub fn normalize_email(raw: &str) -> Result<String, UserError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(UserError::InvalidEmail),
    }
}

/// Who is signed in on this device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    current_user: Option<User>,
}

impl AuthState {
    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}
