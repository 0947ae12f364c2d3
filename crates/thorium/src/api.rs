//! HTTP error responses.
//!
//! Every failure leaves the service as a status code plus an
//! [`ErrorBody`] naming the error kind:
//!
//! | Kind | Status |
//! |---|---|
//! | `Internal` | 500 |
//! | `Conflict` | 409 |
//! | `NotFound` on a read endpoint | 404 |
//! | everything else | 400 |
//!
//! Request bodies go through [`ApiJson`], so a body that doesn't parse is
//! reported the same way, as `InvalidArgument`.

use axum::Json;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thorium_protocol::{ErrorBody, ErrorKind};

use crate::ThoriumError;

/// An error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Maps an error raised by a mutating endpoint.
    pub fn new(err: impl Into<ThoriumError>) -> Self {
        let err = err.into();
        let kind = err.kind();
        Self {
            status: status_for(kind),
            body: ErrorBody {
                error: kind,
                message: err.to_string(),
            },
        }
    }

    /// Maps an error raised by a read endpoint, where a missing entity is 404.
    pub fn lookup(err: impl Into<ThoriumError>) -> Self {
        let mut api = Self::new(err);
        if api.body.error == ErrorKind::NotFound {
            api.status = StatusCode::NOT_FOUND;
        }
        api
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> ErrorKind {
        self.body.error
    }
}

impl<E: Into<ThoriumError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

/// Request body extractor. Same as [`axum::Json`], except that rejections
/// come back as an [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub T);

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(kind = %self.body.error, message = %self.body.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, kind = %self.body.error, "request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}
