use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteClientError {
    #[error("{service} endpoint is not configured")]
    NotConfigured { service: &'static str },
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("invalid endpoint url '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },
}

impl SiteClientError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Http { service, source }
    }

    pub fn service(&self) -> Option<&'static str> {
        match self {
            SiteClientError::NotConfigured { service }
            | SiteClientError::Http { service, .. }
            | SiteClientError::Rejected { service, .. } => Some(*service),
            SiteClientError::Validation { .. } | SiteClientError::Url { .. } => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SiteClientError::NotConfigured { .. } => ErrorCode::NotConfigured,
            SiteClientError::Validation { .. } => ErrorCode::Validation,
            SiteClientError::Url { .. } => ErrorCode::NotConfigured,
            SiteClientError::Http { source, .. } if source.is_decode() => ErrorCode::Decode,
            SiteClientError::Http { .. } | SiteClientError::Rejected { .. } => ErrorCode::Upstream,
        }
    }
}

impl From<&SiteClientError> for ApiError {
    fn from(value: &SiteClientError) -> Self {
        let error = ApiError::new(value.code(), value.to_string());
        match value.service() {
            Some(service) => error.with_service(service),
            None => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_api_error_without_service() {
        let err = SiteClientError::validation("amount", "Please enter a valid donation amount");

        let api = ApiError::from(&err);

        assert_eq!(api.code, ErrorCode::Validation);
        assert_eq!(api.service, None);
        assert_eq!(api.message, "invalid amount: Please enter a valid donation amount");
    }

    #[test]
    fn rejection_keeps_the_service_name() {
        let err = SiteClientError::Rejected {
            service: "calendar",
            message: "API key not valid".into(),
        };

        let api = ApiError::from(&err);

        assert_eq!(api.code, ErrorCode::Upstream);
        assert_eq!(api.service.as_deref(), Some("calendar"));
    }
}
