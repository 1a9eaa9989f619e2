//! Error types and utilities for Tally Bot

use thiserror::Error;

/// Result type alias for Tally operations
pub type Result<T> = std::result::Result<T, TallyError>;

/// Boxed source error carried by the structured variants
type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for Tally operations
#[derive(Error, Debug)]
pub enum TallyError {
    /// Ledger, preference, or block store could not be read or written
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Every delivery attempt for a notice failed
    #[error("Notification delivery failed: {message}")]
    NotificationDeliveryFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A window name outside `today`, `week`, `overall`
    #[error("Invalid window '{0}', expected one of: today, week, overall")]
    InvalidWindow(String),

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TallyError {
    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new storage error with source
    pub fn storage_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StorageUnavailable {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new notification delivery error
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::NotificationDeliveryFailed {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new notification delivery error with source
    pub fn delivery_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::NotificationDeliveryFailed {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether the error comes from a storage backend
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let storage_error = TallyError::storage("ledger offline");
        assert!(storage_error.to_string().contains("Storage unavailable"));
        assert!(storage_error.to_string().contains("ledger offline"));
        assert!(storage_error.is_storage());

        let config_error = TallyError::config("config issue");
        assert_eq!(config_error.to_string(), "Configuration error: config issue");
        assert!(!config_error.is_storage());

        let validation_error = TallyError::validation_field("must be positive", "max_events");
        assert!(validation_error.to_string().contains("must be positive"));
    }

    #[test]
    fn test_invalid_window_display() {
        let error = TallyError::InvalidWindow("month".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid window 'month', expected one of: today, week, overall"
        );
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "database file missing");
        let wrapped = TallyError::storage_with_source("Failed to open ledger", io_error);

        assert!(wrapped.to_string().contains("Failed to open ledger"));
        assert!(wrapped.source().is_some());

        let delivery = TallyError::delivery_with_source(
            "rich notice rejected",
            io::Error::new(io::ErrorKind::TimedOut, "gateway timeout"),
        );
        assert!(delivery.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "Access denied");
        let error: TallyError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_error = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let error: TallyError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }
}
