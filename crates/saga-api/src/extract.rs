//! Body extractors that accept more than one encoding.
//!
//! The quiz front-end posts `FormData` objects; scripted clients tend to
//! send urlencoded bodies. `FormData` gives handlers the same field list
//! either way. `JsonOrForm` does the same for the story server's JSON
//! endpoints.

use axum::Json;
use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use saga_core::error::DomainError;
use serde::de::DeserializeOwned;

use crate::error::ErrorBody;

/// One submitted form field.
#[derive(Debug, Clone)]
pub struct FormField {
    /// Field name.
    pub name: String,
    /// Client-side file name, for file fields.
    pub file_name: Option<String>,
    /// Raw field value.
    pub data: Bytes,
}

/// All fields of a submitted form, in submission order.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: Vec<FormField>,
}

impl FormData {
    /// Builds a form from `(name, value)` text pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| FormField {
                    name,
                    file_name: None,
                    data: Bytes::from(value),
                })
                .collect(),
        }
    }

    /// Returns the first text value of `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.all(name).into_iter().next()
    }

    /// Returns every text value of `name`, for repeated fields.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .filter_map(|f| std::str::from_utf8(&f.data).ok())
            .collect()
    }

    /// Returns the text value of a required field.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the field is absent.
    pub fn required(&self, name: &str) -> Result<&str, DomainError> {
        self.text(name)
            .ok_or_else(|| DomainError::Validation(format!("missing form field: {name}")))
    }

    /// Parses a required field.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the field is absent or does
    /// not parse.
    pub fn parsed<T: std::str::FromStr>(&self, name: &str) -> Result<T, DomainError> {
        self.required(name)?
            .trim()
            .parse()
            .map_err(|_| DomainError::Validation(format!("invalid form field: {name}")))
    }

    /// Returns the first field named `name` carrying a file.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&FormField> {
        self.fields
            .iter()
            .find(|f| f.name == name && f.file_name.is_some())
    }
}

/// Rejection produced when a body cannot be decoded.
#[derive(Debug)]
pub struct FormRejection {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl FormRejection {
    fn form(status: StatusCode, message: String) -> Self {
        Self {
            status,
            error: "invalid_form",
            message,
        }
    }
}

impl IntoResponse for FormRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn content_type(req: &Request) -> String {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = FormRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if content_type(&req).starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| FormRejection::form(e.status(), e.body_text()))?;
            let mut fields = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| FormRejection::form(e.status(), e.body_text()))?
            {
                let name = field.name().unwrap_or_default().to_owned();
                let file_name = field.file_name().map(str::to_owned);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| FormRejection::form(e.status(), e.body_text()))?;
                fields.push(FormField {
                    name,
                    file_name,
                    data,
                });
            }
            return Ok(Self { fields });
        }

        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|e| FormRejection::form(e.status(), e.body_text()))?;
        Ok(Self::from_pairs(pairs))
    }
}

/// A typed body sent either as JSON or as an urlencoded form.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = FormRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if content_type(&req).starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| FormRejection::form(e.status(), e.body_text()))?;
            return Ok(Self(value));
        }

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| FormRejection {
                status: e.status(),
                error: "invalid_json",
                message: e.body_text(),
            })?;
        Ok(Self(value))
    }
}
