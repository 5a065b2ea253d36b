//! Error types for the dominant_colors library

use thiserror::Error;

/// Result type alias for dominant_colors operations
pub type Result<T> = std::result::Result<T, DominantColorError>;

/// Error kinds surfaced by the pipeline and its collaborators
///
/// Invalid marks and out-of-order pipeline calls are not errors: marks report
/// failure through their boolean result and premature steps degrade to empty
/// results. Only collaborator failures and I/O problems end up here.
#[derive(Error, Debug)]
pub enum DominantColorError {
    /// Image file could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The segmentation solver failed while refining the region mask
    #[error("Segmentation failed: {message}")]
    Segmentation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The face detector failed; the pipeline treats this as "no faces"
    #[error("Face detection failed: {message}")]
    FaceDetection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A collaborator returned a mask whose size does not match the image
    #[error("Mask dimensions {actual_width}x{actual_height} do not match image {width}x{height}")]
    MaskDimensions {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Configuration file could not be read or written
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Generic processing error
    #[error("Processing error: {0}")]
    Processing(String),
}

impl DominantColorError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a segmentation error with context
    pub fn segmentation<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Segmentation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a face detection error with context
    pub fn face_detection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::FaceDetection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error indicates a recoverable condition
    ///
    /// Face detection is advisory, so its failure never invalidates the
    /// analysis. A failed segmentation only aborts that `grab_cut` call; the
    /// marks are kept and the step can be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DominantColorError::FaceDetection { .. } | DominantColorError::Segmentation { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            DominantColorError::ImageLoad { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            DominantColorError::Segmentation { .. } => {
                "Could not separate the subject from the background. Try marking the subject more precisely.".to_string()
            }
            DominantColorError::FaceDetection { .. } => {
                "Face detection is unavailable; skin tones will not be removed.".to_string()
            }
            DominantColorError::Config { .. } => {
                "Could not read the configuration file.".to_string()
            }
            _ => "Color extraction failed. Please try with a different image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmentation_error_is_recoverable() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "solver crashed");
        let err = DominantColorError::segmentation("grabCut", io);
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("grabCut"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = DominantColorError::invalid_parameter("k", 0);
        assert_eq!(err.to_string(), "Invalid parameter: k = 0");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_user_message_for_image_load() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = DominantColorError::image_load("photo.jpg", io);
        assert!(err.user_message().starts_with("Could not load the image"));
    }
}
