//! Login and registration payloads, with the same field rules the login views enforce.

use serde::{Deserialize, Serialize};

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=20;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub token: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the first rule violation, if any.
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    /// Checked locally, never sent.
    #[serde(skip_serializing, default)]
    pub confirm_password: String,
    pub email: String,
    pub code: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        if self.email.trim().is_empty() {
            return Err("Please enter an email address".into());
        }
        if !self.email.contains('@') {
            return Err("Please enter a valid email address".into());
        }
        validate_password(&self.password)?;
        if self.confirm_password.is_empty() {
            return Err("Please enter the password again".into());
        }
        if self.confirm_password != self.password {
            return Err("The two passwords do not match".into());
        }
        if self.code.trim().is_empty() {
            return Err("Please enter the verification code".into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct LogoutRequest {
    pub token: String,
}

fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Please enter a username".into());
    }
    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err("Username must be between 3 and 20 characters".into());
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Please enter a password".into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters".into());
    }
    Ok(())
}
