//! Bearer authentication with Cognito ID tokens.

mod jwt_middleware;
pub(crate) use jwt_middleware::JwtAuth;

mod jwt_token_auth;
