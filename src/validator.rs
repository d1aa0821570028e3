use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use schoolhub_core::AppError;

/// Joins every field error into one message, ordered by field name so the
/// output is stable.
pub(crate) fn format_errors(errors: &ValidationErrors) -> String {
    let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
    field_errors.sort_by_key(|(field, _)| field.clone());

    let messages: Vec<String> = field_errors
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();

    messages.join(", ")
}

/// Name of the field serde reported as missing, if that is the failure.
fn missing_field(body_text: &str) -> Option<&str> {
    let (_, rest) = body_text.split_once("missing field `")?;
    rest.split('`').next()
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Missing 'Content-Type: application/json' header".to_string()
        }
        JsonRejection::JsonDataError(_) => {
            let body_text = rejection.body_text();
            match missing_field(&body_text) {
                Some(field) => format!("{} is required", field),
                None => "Invalid field type in request".to_string(),
            }
        }
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON body".to_string(),
        _ => "Invalid request body".to_string(),
    };

    AppError::validation(anyhow!(message))
}

/// JSON body extractor that runs `validator` rules before the handler sees
/// the value. Every rejection is a 400 validation error.
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
            .map_err(rejection_error)?;

        value
            .validate()
            .map_err(|errors| AppError::validation(anyhow!(format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}
