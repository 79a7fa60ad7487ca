use async_trait::async_trait;
use serde_json::{json, Value};

pub const SERVICE_UNAVAILABLE_CODE: &str = "SERVICE_UNAVAILABLE";
pub const INVALID_RESPONSE_CODE: &str = "INVALID_RESPONSE";
pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";
pub const UNAUTHORIZED_CODE: &str = "UNAUTHORIZED";
pub const FORBIDDEN_CODE: &str = "FORBIDDEN";

pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Service temporarily unavailable. Please try again later.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Name carried by serialised errors so they can be recognised after
/// crossing a boundary as plain JSON.
const ERROR_NAME: &str = "ApiError";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Service temporarily unavailable. Please try again later.")]
    ServiceUnavailable,
    #[error("{message}")]
    Api {
        code: Option<String>,
        message: String,
        status: Option<u16>,
    },
    #[error("{message}")]
    InvalidResponse { message: String },
    #[error("{message}")]
    Network { message: String },
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,
    #[error("You do not have permission to view this data.")]
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    ServiceUnavailable,
    Api,
    InvalidResponse,
    Network,
    SessionExpired,
    Forbidden,
}

impl ApiError {
    pub fn api(code: Option<&str>, message: impl Into<String>) -> Self {
        ApiError::Api {
            code: code.map(str::to_string),
            message: message.into(),
            status: None,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        ApiError::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn network(message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(NETWORK_ERROR_MESSAGE);
        ApiError::Network {
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::ServiceUnavailable => ApiErrorKind::ServiceUnavailable,
            ApiError::Api { .. } => ApiErrorKind::Api,
            ApiError::InvalidResponse { .. } => ApiErrorKind::InvalidResponse,
            ApiError::Network { .. } => ApiErrorKind::Network,
            ApiError::SessionExpired => ApiErrorKind::SessionExpired,
            ApiError::Forbidden => ApiErrorKind::Forbidden,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::ServiceUnavailable => Some(SERVICE_UNAVAILABLE_CODE),
            ApiError::Api { code, .. } => code.as_deref(),
            ApiError::InvalidResponse { .. } => Some(INVALID_RESPONSE_CODE),
            ApiError::Network { .. } => Some(NETWORK_ERROR_CODE),
            ApiError::SessionExpired => Some(UNAUTHORIZED_CODE),
            ApiError::Forbidden => Some(FORBIDDEN_CODE),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServiceUnavailable => Some(503),
            ApiError::Api { status, .. } => *status,
            ApiError::SessionExpired => Some(401),
            ApiError::Forbidden => Some(403),
            ApiError::InvalidResponse { .. } | ApiError::Network { .. } => None,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "name": ERROR_NAME,
            "code": self.code(),
            "message": self.to_string(),
            "status": self.status(),
        })
    }

    /// Rebuilds an error from anything shaped like one: an object with a
    /// `code`, or named `ApiError` with a `message`. Returns `None` for
    /// values that do not look like an API error.
    pub fn from_value(value: &Value) -> Option<ApiError> {
        let object = value.as_object()?;
        let name = object.get("name").and_then(Value::as_str);
        let code = object
            .get("code")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty());
        let message = object.get("message").and_then(Value::as_str);
        let status = object
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok());

        if code.is_none() && name != Some(ERROR_NAME) {
            return None;
        }

        let error = match (code, status) {
            (Some(SERVICE_UNAVAILABLE_CODE), _) | (None, Some(503)) => {
                ApiError::ServiceUnavailable
            }
            (Some(INVALID_RESPONSE_CODE), _) => {
                ApiError::invalid_response(message.unwrap_or("Invalid response from server"))
            }
            (Some(NETWORK_ERROR_CODE), _) => ApiError::network(message),
            (Some(UNAUTHORIZED_CODE), _) | (None, Some(401)) => ApiError::SessionExpired,
            (Some(FORBIDDEN_CODE), _) | (None, Some(403)) => ApiError::Forbidden,
            (code, status) => ApiError::Api {
                code: code.map(str::to_string),
                message: message.unwrap_or("Request failed").to_string(),
                status,
            },
        };
        Some(error)
    }

    /// Like [`ApiError::from_value`] but never fails: strings become their own
    /// message and anything else gets the generic network fallback.
    pub fn from_unknown(value: &Value) -> ApiError {
        if let Some(error) = ApiError::from_value(value) {
            return error;
        }
        match value {
            Value::String(message) => ApiError::api(None, message.clone()),
            Value::Object(object) => {
                ApiError::network(object.get("message").and_then(Value::as_str))
            }
            _ => ApiError::network(None),
        }
    }
}

/// A GET against the admin proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: &'static str,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn param_opt(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    #[cfg(test)]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.to_string()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }

    /// Equal for requests with equal parameters regardless of the order they
    /// were added in.
    pub fn cache_key(&self) -> QueryKey {
        let mut params = self.query.clone();
        params.sort();
        QueryKey {
            path: self.path,
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub path: &'static str,
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP GET with the session attached. Connection-level
/// failures map to [`ApiError::Network`]; every HTTP status is returned as a
/// [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &ApiRequest) -> Result<RawResponse, ApiError>;
}
