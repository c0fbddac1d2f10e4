use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Box<str>),
    #[error("Bad Gateway: {0}")]
    BadGateway(Box<str>),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Serialize)]
struct HttpErrorBody {
    error: Box<str>,
}

impl Error {
    pub fn status(&self) -> http::StatusCode {
        match self {
            Error::BadRequest(_) => http::StatusCode::BAD_REQUEST,
            Error::BadGateway(_) => http::StatusCode::BAD_GATEWAY,
        }
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error = match self {
            Error::BadRequest(msg) | Error::BadGateway(msg) => msg,
        };

        (status, axum::Json(HttpErrorBody { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(Error::BadRequest("x".into()).into_response().status(), 400);
        assert_eq!(Error::BadGateway("x".into()).into_response().status(), 502);
    }

    #[test]
    fn display_carries_message() {
        assert_eq!(
            Error::BadRequest("message is required".into()).to_string(),
            "Bad Request: message is required"
        );
    }
}
