use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use classlog_core::AppError;

fn format_errors(errors: &ValidationErrors) -> String {
    let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
    field_errors.sort_by(|a, b| a.0.cmp(&b.0));

    field_errors
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extracts the backtick-quoted name that follows `marker` in a serde message.
fn quoted_after<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    message.split(marker).nth(1)?.split('`').next()
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let error_msg = rejection.body_text();

    if let Some(field) = quoted_after(&error_msg, "missing field `") {
        return AppError::bad_request(anyhow!("{} is required", field));
    }

    if let Some(field) = quoted_after(&error_msg, "unknown field `") {
        return AppError::bad_request(anyhow!("Unknown field: {}", field));
    }

    if error_msg.contains("unknown variant") {
        return AppError::bad_request(anyhow!("Invalid value in request"));
    }

    if error_msg.contains("invalid type") || error_msg.contains("UUID parsing failed") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
}

/// JSON body extractor that runs `validator` rules before the handler.
///
/// Every failure, whether the body does not parse or a rule rejects a field,
/// becomes a 400 with a message naming the field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value
            .validate()
            .map_err(|errors| AppError::bad_request(anyhow!("{}", format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

fn path_rejection_to_error(rejection: PathRejection) -> AppError {
    if rejection.status().is_server_error() {
        return AppError::internal_error(rejection.body_text());
    }
    AppError::bad_request(anyhow!("Invalid id in path"))
}

fn query_rejection_to_error(_: QueryRejection) -> AppError {
    AppError::bad_request(anyhow!("Invalid query parameters"))
}

/// `Path` extractor whose rejection is the usual JSON error body.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection_to_error)?;
        Ok(ValidatedPath(value))
    }
}

/// `Query` extractor whose rejection is the usual JSON error body.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(query_rejection_to_error)?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use classlog_models::classes::CreateClassDto;
    use classlog_models::students::CreateStudentDto;

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_names_field() {
        let err = ValidatedJson::<CreateClassDto>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "name is required");
    }

    #[tokio::test]
    async fn test_unknown_field_rejected() {
        let err = ValidatedJson::<CreateClassDto>::from_request(
            json_request(r#"{"name":"Art","owner":"me"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "Unknown field: owner");
    }

    #[tokio::test]
    async fn test_validation_failure_is_bad_request() {
        let body = r#"{"name":"Ana","cpf":"123.456.789-01","phone":"11987654321","class_id":"7f1c1d7e-9b8a-4a51-8a4f-3c2d1e0f9a8b"}"#;
        let err = ValidatedJson::<CreateStudentDto>::from_request(json_request(body), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.error.to_string().contains("at least two words"));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"name":"Art"}"#))
            .unwrap();
        let err = ValidatedJson::<CreateClassDto>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(dto) =
            ValidatedJson::<CreateClassDto>::from_request(json_request(r#"{"name":"Art"}"#), &())
                .await
                .unwrap();
        assert_eq!(dto.name, "Art");
    }

    #[tokio::test]
    async fn test_query_rejection_is_bad_request() {
        #[derive(serde::Deserialize, Debug)]
        struct Params {
            #[allow(dead_code)]
            class_id: Option<uuid::Uuid>,
        }

        let (mut parts, _) = Request::builder()
            .uri("/?class_id=not-a-uuid")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        let err = ValidatedQuery::<Params>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "Invalid query parameters");
    }
}
