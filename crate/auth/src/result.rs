use crate::error::AuthError;

pub type AuthResult<R> = Result<R, AuthError>;
