use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::pipeline::PipelineError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, stage) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone(), None),
            ApiError::Pipeline(err) => {
                let status = match err {
                    PipelineError::InvalidReference(_) | PipelineError::UnsupportedLanguage(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    PipelineError::UpstreamFetch(_) | PipelineError::Summarization(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                (status, err.to_string(), Some(err.stage().to_string()))
            }
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "stage": stage,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::PrError;
    use crate::summary::SummaryError;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        assert_eq!(
            status_of(ApiError::BadRequest("prUrl is required".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Pipeline(PipelineError::InvalidReference(
                PrError::InvalidUrl("nope".to_string())
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_upstream_errors_map_to_502() {
        assert_eq!(
            status_of(ApiError::Pipeline(PipelineError::UpstreamFetch(
                PrError::Upstream {
                    status: Some(503),
                    message: "github down".to_string(),
                }
            ))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ApiError::Pipeline(PipelineError::Summarization(
                SummaryError::Empty
            ))),
            StatusCode::BAD_GATEWAY
        );
    }
}
