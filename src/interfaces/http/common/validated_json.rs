//! JSON body extractor that runs `validator` rules after deserializing

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ApiResponse;

/// `axum::Json` plus `validator` rules. Malformed JSON is a 400, a rule
/// violation a 422 listing every failing field.
pub struct ValidatedJson<T>(pub T);

/// Error type for `ValidatedJson` extraction failures.
pub enum ValidatedJsonRejection {
    /// Body is not valid JSON for `T`
    Malformed(JsonRejection),
    /// A `validator` rule failed
    Invalid(validator::ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Malformed(rejection) => {
                let body = ApiResponse::<()>::error(format!("Invalid JSON: {}", rejection));
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::Invalid(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            let msg = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("{:?}", e.code));
                            format!("{}: {}", field, msg)
                        })
                    })
                    .collect();

                let message = if field_errors.is_empty() {
                    "Validation failed".to_string()
                } else {
                    field_errors.join("; ")
                };

                let body = ApiResponse::<()>::error(message);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Malformed)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::Invalid)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct PlateBody {
        #[validate(length(min = 2, max = 12))]
        plate: String,
        #[validate(range(min = 1, max = 1000))]
        spaces: u32,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<PlateBody>) -> &'static str {
        "ok"
    }

    async fn send(body: Body) -> StatusCode {
        use tower::Service;
        let req = Request::builder()
            .method("POST")
            .uri("/plates")
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let mut svc = Router::new().route("/plates", post(handler)).into_service();
        svc.call(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let body = serde_json::json!({"plate": "AB123CD", "spaces": 4});
        assert_eq!(send(Body::from(body.to_string())).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        assert_eq!(send(Body::from("{plate")).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rule_violation_is_unprocessable() {
        let body = serde_json::json!({"plate": "A", "spaces": 0});
        assert_eq!(
            send(Body::from(body.to_string())).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
