//! Handler responses

use http::StatusCode;
use hintbind_validation::Value;

use crate::error::ApiError;

/// Response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(serde_json::Value),
    Text(String),
}

/// Response returned by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl Response {
    /// Empty 200 response
    pub fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            body: ResponseBody::Empty,
        }
    }

    /// 200 response with a JSON body
    pub fn json(body: impl Into<serde_json::Value>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: ResponseBody::Json(body.into()),
        }
    }

    /// 200 response rendering a validated value as JSON
    pub fn value(value: Value) -> Self {
        Self::json(serde_json::Value::from(value))
    }

    /// 200 response with a text body
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: vec![("content-type".to_string(), "text/plain; charset=utf-8".to_string())],
            body: ResponseBody::Text(body.into()),
        }
    }

    /// Error response: status from the error, detail as JSON
    pub fn error(error: &ApiError) -> Self {
        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::json(error.to_detail()).with_status(status)
    }

    /// Set the status code
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// JSON body, if any
    pub fn body_json(&self) -> Option<&serde_json::Value> {
        match &self.body {
            ResponseBody::Json(json) => Some(json),
            _ => None,
        }
    }
}

impl ApiError {
    /// One structured error response for this error
    pub fn into_response(self) -> Response {
        Response::error(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamErrors;
    use hintbind_validation::ValidationError;

    #[test]
    fn test_validation_error_response() {
        let mut errors = ParamErrors::new();
        errors.add_error("q", ValidationError::missing_error());
        let response = ApiError::Validation(errors).into_response();

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.body_json(),
            Some(&serde_json::json!({"q": ["This field is required."]}))
        );
    }

    #[test]
    fn test_value_response() {
        let response = Response::value(Value::object([("id", Value::Int(9))]));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body_json(), Some(&serde_json::json!({"id": 9})));
    }
}
