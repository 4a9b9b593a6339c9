use thiserror::Error;

/// Top-level error type for the clipping and offsetting engines.
#[derive(Debug, Error)]
pub enum ClipperError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to input geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("coordinate ({x}, {y}) is outside the allowed range +/-{limit}")]
    CoordinateOutOfRange { x: i64, y: i64, limit: i64 },
}

/// Errors related to the polygon tree.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Errors related to clipping and offsetting operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("open paths can only be clipped into a PolyTree")]
    OpenPathsRequireTree,

    #[error("intersections in the scanbeam ending at y = {y} could not be ordered")]
    IntersectionOrder { y: i64 },

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`ClipperError`].
pub type Result<T> = std::result::Result<T, ClipperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_errors_convert_into_top_level() {
        let err: ClipperError = OperationError::IntersectionOrder { y: 42 }.into();
        assert!(matches!(
            err,
            ClipperError::Operation(OperationError::IntersectionOrder { y: 42 })
        ));
        assert!(err.to_string().contains("y = 42"));
    }

    #[test]
    fn range_error_message_names_the_point() {
        let err: ClipperError = GeometryError::CoordinateOutOfRange {
            x: 1,
            y: -2,
            limit: 3,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "coordinate (1, -2) is outside the allowed range +/-3"
        );
    }
}
