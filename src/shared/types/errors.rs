use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Reference data (pool capacity) is missing for a vehicle type.
    #[error("Not configured: {what} for vehicle type {vehicle_type}")]
    NotConfigured {
        what: &'static str,
        vehicle_type: String,
    },

    #[error("No {unit} price configured for vehicle type {vehicle_type}")]
    PriceNotConfigured { vehicle_type: String, unit: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{service} failure: {message}")]
    UpstreamFailure {
        service: &'static str,
        message: String,
        retryable: bool,
    },

    /// A conditional reservation write found the row in another state.
    #[error("Reservation {0} was changed concurrently")]
    StaleState(String),

    /// Generated reservation code collided with an existing one.
    #[error("Duplicate reservation code {0}")]
    DuplicateCode(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            DomainError::Storage(_) => true,
            DomainError::UpstreamFailure { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_and_retryable_upstream_are_transient() {
        assert!(DomainError::Storage("locked".into()).is_transient());
        assert!(DomainError::UpstreamFailure {
            service: "payment",
            message: "timed out".into(),
            retryable: true,
        }
        .is_transient());
        assert!(!DomainError::UpstreamFailure {
            service: "payment",
            message: "card declined".into(),
            retryable: false,
        }
        .is_transient());
        assert!(!DomainError::Conflict("full".into()).is_transient());
        assert!(!DomainError::StaleState("0A1B2C3D".into()).is_transient());
        assert!(!DomainError::invalid("end_time", "before start").is_transient());
    }

    #[test]
    fn invalid_input_names_the_field() {
        let err = DomainError::invalid("email", "is required");
        assert_eq!(err.to_string(), "Invalid email: is required");
    }
}
