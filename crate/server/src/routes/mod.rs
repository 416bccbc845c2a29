use actix_web::{
    HttpRequest, HttpResponse, HttpResponseBuilder, get,
    http::{StatusCode, header},
    web::Json,
};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::{error::HashaError, result::HResult};

pub(crate) mod recipes;
pub(crate) mod users;

impl actix_web::error::ResponseError for HashaError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::Unauthorized(_) | Self::Authentication(_) => StatusCode::UNAUTHORIZED,

            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,

            Self::UrlError(_) => StatusCode::UNPROCESSABLE_ENTITY,

            Self::DatabaseError(_)
            | Self::ConversionError(_)
            | Self::ClientConnectionError(_)
            | Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let message = self.to_string();

        if status_code >= StatusCode::INTERNAL_SERVER_ERROR {
            error!("{status_code} - {message}");
        } else {
            warn!("{status_code} - {message}");
        }

        // credentials problems never say more than this to the client
        let detail = match self {
            Self::Unauthorized(_) => "Unauthorized".to_owned(),
            _ => message,
        };

        let mut response = HttpResponseBuilder::new(status_code);
        if matches!(self, Self::Authentication(_)) {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        response.json(json!({ "detail": detail }))
    }
}

#[get("/")]
pub(crate) async fn root() -> HResult<Json<Value>> {
    Ok(Json(json!({ "Hello": "there" })))
}

/// Fallback for any route the API does not serve
pub(crate) async fn not_found(req: HttpRequest) -> HResult<HttpResponse> {
    Err(HashaError::NotFound(format!("{} {}", req.method(), req.path())))
}
