//! Error types for the vblock_height library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for vblock_height operations
pub type Result<T> = std::result::Result<T, MeasurementError>;

/// Errors raised inside the measurement pipeline.
///
/// These never escape the `measure_*` entry points; they are folded into a
/// [`Failure`] attached to an absent measurement.
#[derive(Error, Debug)]
pub enum MeasurementError {
    /// Image file could not be read or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// OpenCV operation failed
    #[error("OpenCV error: {operation}")]
    OpenCvError {
        operation: String,
        #[source]
        source: Option<opencv::Error>,
    },

    /// Generic processing error
    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

impl MeasurementError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an OpenCV error with context
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCvError {
            operation: operation.into(),
            source: Some(source),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    /// Classify this error for caller-facing reporting
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            MeasurementError::ImageLoadError { .. } => FailureKind::UnreadableImage,
            _ => FailureKind::ProcessingFailed,
        }
    }
}

/// Why a measurement came back without a height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The image could not be read or decoded
    UnreadableImage,
    /// A target circle was found but no fixture vertex
    NoFixtureVertex,
    /// A fixture vertex was found but no target circle
    NoTargetCircle,
    /// Neither a fixture vertex nor a target circle was found
    NoFeatures,
    /// Any other failure inside the pipeline
    ProcessingFailed,
}

impl FailureKind {
    /// Get user-friendly description for application display
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::UnreadableImage => {
                "Could not read the image. Please check the file format and try again."
            }
            FailureKind::NoFixtureVertex => {
                "Could not locate the bottom vertex of the V-block. Make sure both faces are visible."
            }
            FailureKind::NoTargetCircle => {
                "Could not locate the workpiece circle. Make sure it sits inside the V-block."
            }
            FailureKind::NoFeatures => "Could not locate the workpiece circle or the V-block.",
            FailureKind::ProcessingFailed => {
                "Measurement failed. Please try with a different image."
            }
        }
    }
}

/// Diagnostic attached to an absent measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// Detailed diagnostic, suitable for logs
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

impl From<&MeasurementError> for Failure {
    fn from(error: &MeasurementError) -> Self {
        Failure::new(error.failure_kind(), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_errors_map_to_unreadable_image() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = MeasurementError::image_load("Failed to open image file: a.png", io);
        assert_eq!(err.failure_kind(), FailureKind::UnreadableImage);
        assert!(err.to_string().contains("a.png"));
    }

    #[test]
    fn test_other_errors_map_to_processing_failed() {
        let err = MeasurementError::invalid_parameter("lines.threshold", 0);
        assert_eq!(err.failure_kind(), FailureKind::ProcessingFailed);
        assert_eq!(err.to_string(), "Invalid parameter: lines.threshold = 0");

        let failure = Failure::from(&MeasurementError::processing("boom"));
        assert_eq!(failure.kind, FailureKind::ProcessingFailed);
        assert_eq!(failure.message, "Processing error: boom");
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let kinds = [
            FailureKind::UnreadableImage,
            FailureKind::NoFixtureVertex,
            FailureKind::NoTargetCircle,
            FailureKind::NoFeatures,
            FailureKind::ProcessingFailed,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.user_message(), b.user_message());
            }
        }
    }
}
