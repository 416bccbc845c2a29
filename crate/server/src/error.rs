use hasha_auth::{AuthError, TokenValidationError};
use thiserror::Error;

// Each error type must have a corresponding HTTP status code (see `routes/mod.rs`)
#[derive(Error, Debug, Clone)]
pub enum HashaError {
    // When a conversion from/to bytes or JSON fails
    #[error("Conversion Error: {0}")]
    ConversionError(String),

    // Missing or malformed arguments in the request
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    // When a user requests a resource which does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    // The caller presented no credentials or the wrong ones
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // The bearer token was refused by the verifier
    #[error("Authentication failed")]
    Authentication(#[source] TokenValidationError),

    // The store answered with an error status
    #[error("Database Error: {0}")]
    DatabaseError(String),

    // The store could not be reached
    #[error("REST client connection error: {0}")]
    ClientConnectionError(String),

    // Any errors related to a bad behavior of the server but not related to the user input
    #[error("Unexpected server error: {0}")]
    ServerError(String),

    #[error("Invalid URL: {0}")]
    UrlError(String),
}

impl From<TokenValidationError> for HashaError {
    fn from(e: TokenValidationError) -> Self {
        Self::Authentication(e)
    }
}

impl From<AuthError> for HashaError {
    fn from(e: AuthError) -> Self {
        Self::Authentication(e.into())
    }
}

impl From<reqwest::Error> for HashaError {
    fn from(e: reqwest::Error) -> Self {
        Self::ClientConnectionError(format!("{e}: details: {e:?}"))
    }
}

impl From<url::ParseError> for HashaError {
    fn from(e: url::ParseError) -> Self {
        Self::UrlError(e.to_string())
    }
}

impl From<serde_json::Error> for HashaError {
    fn from(e: serde_json::Error) -> Self {
        Self::ConversionError(e.to_string())
    }
}

impl From<toml::de::Error> for HashaError {
    fn from(e: toml::de::Error) -> Self {
        Self::ServerError(format!("invalid configuration file: {e}"))
    }
}

impl From<std::io::Error> for HashaError {
    fn from(e: std::io::Error) -> Self {
        Self::ServerError(e.to_string())
    }
}

impl From<tracing_subscriber::util::TryInitError> for HashaError {
    fn from(e: tracing_subscriber::util::TryInitError) -> Self {
        Self::ServerError(e.to_string())
    }
}

/// Return early with an error if a condition is not satisfied.
///
/// This macro is equivalent to `if !$cond { return Err(From::from($err)); }`.
#[macro_export]
macro_rules! hasha_ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($crate::hasha_error!($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return ::core::result::Result::Err($crate::hasha_error!($fmt, $($arg)*));
        }
    };
}

/// Construct a server error from a string.
#[macro_export]
macro_rules! hasha_error {
    ($msg:literal) => {
        $crate::error::HashaError::ServerError(::core::format_args!($msg).to_string())
    };
    ($err:expr $(,)?) => ({
        $crate::error::HashaError::ServerError($err.to_string())
    });
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::HashaError::ServerError(::core::format_args!($fmt, $($arg)*).to_string())
    };
}

/// Return early with a server error.
#[macro_export]
macro_rules! hasha_bail {
    ($msg:literal) => {
        return ::core::result::Result::Err($crate::hasha_error!($msg))
    };
    ($err:expr $(,)?) => {
        return ::core::result::Result::Err($err)
    };
    ($fmt:expr, $($arg:tt)*) => {
        return ::core::result::Result::Err($crate::hasha_error!($fmt, $($arg)*))
    };
}
