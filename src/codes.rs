//! # Response Codes & Error Classification
//!
//! Every failure the backend can report (either inside the envelope or as an HTTP status)
//! goes through [`classify`]. The result is a [`Classification`]: a taxonomy tag, a
//! user-facing message, and the flags that decide what the gateway does next.
//!
//! Classification is a pure function of the numeric code. The same code gives the same
//! answer no matter which endpoint produced it.

use std::fmt;

// =============================================================================
// 1. THE CODE TABLE
// =============================================================================

pub const SUCCESS: i32 = 200;

pub const OPERATION_FAILED: i32 = 999;
pub const SERVICE_DEGRADED: i32 = 201;
pub const HOT_PARAM_LIMIT: i32 = 202;
pub const SYSTEM_RULE_NOT_SATISFIED: i32 = 203;
pub const AUTH_RULE_FAILED: i32 = 204;

pub const BAD_REQUEST: i32 = 400;
pub const UNAUTHORIZED: i32 = 401;
pub const FORBIDDEN: i32 = 403;
pub const NOT_FOUND: i32 = 404;
pub const METHOD_NOT_ALLOWED: i32 = 405;

pub const INTERNAL_SERVER_ERROR: i32 = 500;
pub const MATH_OPERATION_ERROR: i32 = 375;

pub const INVALID_TOKEN: i32 = 2001;
pub const EXPIRED_TOKEN: i32 = 2002;
pub const ACCESS_DENIED: i32 = 2003;
pub const CLIENT_AUTH_FAILED: i32 = 1001;
pub const USERNAME_PASSWORD_ERROR: i32 = 1002;
pub const UNSUPPORTED_GRANT_TYPE: i32 = 1003;
pub const BUSINESS_ERROR: i32 = 1004;

/// Message used when neither the table nor the server has anything better.
pub const FALLBACK_MESSAGE: &str = "Unknown error, please try again later";

/// Message shown for failures where no response was received at all.
pub const NETWORK_MESSAGE: &str = "Network connection failed, please check your network settings";

const CLEAR_AUTH_CODES: &[i32] = &[
    INVALID_TOKEN,
    EXPIRED_TOKEN,
    CLIENT_AUTH_FAILED,
    UNAUTHORIZED,
    // Lacking permission also forces a fresh login, otherwise the views bounce forever.
    ACCESS_DENIED,
    FORBIDDEN,
];

const REDIRECT_LOGIN_CODES: &[i32] = &[
    INVALID_TOKEN,
    EXPIRED_TOKEN,
    CLIENT_AUTH_FAILED,
    UNAUTHORIZED,
    ACCESS_DENIED,
    FORBIDDEN,
];

const WARNING_CODES: &[i32] = &[
    INVALID_TOKEN,
    EXPIRED_TOKEN,
    ACCESS_DENIED,
    FORBIDDEN,
    SERVICE_DEGRADED,
    HOT_PARAM_LIMIT,
    SYSTEM_RULE_NOT_SATISFIED,
];

const SILENT_CODES: &[i32] = &[];

// =============================================================================
// 2. THE TAXONOMY
// =============================================================================

/// Coarse category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Auth,
    Permission,
    Validation,
    Business,
    System,
    Network,
}

impl ErrorKind {
    /// Maps a code to its kind. Unmapped codes are system errors.
    pub fn of(code: i32) -> Self {
        match code {
            INVALID_TOKEN | EXPIRED_TOKEN | CLIENT_AUTH_FAILED | USERNAME_PASSWORD_ERROR
            | UNSUPPORTED_GRANT_TYPE | UNAUTHORIZED => ErrorKind::Auth,
            ACCESS_DENIED | FORBIDDEN | AUTH_RULE_FAILED => ErrorKind::Permission,
            BAD_REQUEST | METHOD_NOT_ALLOWED => ErrorKind::Validation,
            BUSINESS_ERROR => ErrorKind::Business,
            NOT_FOUND => ErrorKind::Network,
            _ => ErrorKind::System,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::Permission => "permission",
            ErrorKind::Validation => "validation",
            ErrorKind::Business => "business",
            ErrorKind::System => "system",
            ErrorKind::Network => "network",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn mapped_message(code: i32) -> Option<&'static str> {
    let message = match code {
        INVALID_TOKEN => "Login state is invalid, please log in again",
        EXPIRED_TOKEN => "Login has expired, please log in again",
        CLIENT_AUTH_FAILED => "Client authentication failed",
        USERNAME_PASSWORD_ERROR => "Incorrect username or password",
        UNSUPPORTED_GRANT_TYPE => "Unsupported authentication mode",
        UNAUTHORIZED => "Please log in first",

        ACCESS_DENIED | FORBIDDEN => "Insufficient permissions, please contact an administrator",
        AUTH_RULE_FAILED => "Permission check failed, please contact an administrator",

        BAD_REQUEST => "Invalid request parameters, please check your input",
        METHOD_NOT_ALLOWED => "Request method not allowed",

        BUSINESS_ERROR => "Business processing failed, please try again later",

        INTERNAL_SERVER_ERROR => "Internal server error, please try again later",
        MATH_OPERATION_ERROR => "Calculation error, please try again later",
        OPERATION_FAILED => "Operation failed, please try again later",
        SERVICE_DEGRADED => "Service is busy, please try again later",
        HOT_PARAM_LIMIT => "Too many requests, please try again later",
        SYSTEM_RULE_NOT_SATISFIED => "System is busy, please try again later",

        NOT_FOUND => "The requested resource does not exist",
        _ => return None,
    };
    Some(message)
}

// =============================================================================
// 3. CLASSIFICATION
// =============================================================================

/// What the gateway should do about a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub code: i32,
    pub kind: ErrorKind,
    pub message: String,
    pub clear_auth: bool,
    pub redirect_to_login: bool,
    pub warning: bool,
    pub silent: bool,
}

impl Classification {
    /// True when the failure must go through the debounced auth-failure path.
    pub fn is_auth_failure(&self) -> bool {
        self.clear_auth || self.redirect_to_login
    }
}

/// Classifies a response or status code.
///
/// `server_message` is used when the code has no mapped message. Never panics.
pub fn classify(code: i32, server_message: Option<&str>) -> Classification {
    let message = mapped_message(code)
        .map(str::to_owned)
        .or_else(|| {
            server_message
                .filter(|m| !m.trim().is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned());

    Classification {
        code,
        kind: ErrorKind::of(code),
        message,
        clear_auth: CLEAR_AUTH_CODES.contains(&code),
        redirect_to_login: REDIRECT_LOGIN_CODES.contains(&code),
        warning: WARNING_CODES.contains(&code),
        silent: SILENT_CODES.contains(&code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_token_clears_and_redirects() {
        let c = classify(EXPIRED_TOKEN, Some("token expired"));
        assert_eq!(c.kind, ErrorKind::Auth);
        assert!(c.clear_auth);
        assert!(c.redirect_to_login);
        assert!(c.warning);
        assert!(!c.silent);
        assert_eq!(c.message, "Login has expired, please log in again");
    }

    #[test]
    fn test_wrong_password_is_auth_but_keeps_session() {
        // Bad credentials are an auth-kind failure, but there is no session to drop.
        let c = classify(USERNAME_PASSWORD_ERROR, None);
        assert_eq!(c.kind, ErrorKind::Auth);
        assert!(!c.is_auth_failure());
    }

    #[test]
    fn test_forbidden_is_permission_and_forces_login() {
        let c = classify(FORBIDDEN, None);
        assert_eq!(c.kind, ErrorKind::Permission);
        assert!(c.is_auth_failure());
    }

    #[test]
    fn test_unmapped_code_falls_back_to_system() {
        let c = classify(12345, None);
        assert_eq!(c.kind, ErrorKind::System);
        assert_eq!(c.message, FALLBACK_MESSAGE);
        assert!(!c.is_auth_failure());

        // Server text wins over the generic fallback when the code is unknown.
        let c = classify(12345, Some("quota exceeded"));
        assert_eq!(c.message, "quota exceeded");

        let c = classify(-1, Some("   "));
        assert_eq!(c.message, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_not_found_is_network_kind() {
        assert_eq!(ErrorKind::of(NOT_FOUND), ErrorKind::Network);
        assert_eq!(ErrorKind::of(BUSINESS_ERROR).to_string(), "business");
    }
}
