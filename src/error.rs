//! Renderer error type
//!
//! Everything here is fatal for the canvas that raised it. Per-frame
//! anomalies (bad clocks, stale animation keys) never become errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no browser window available")]
    NoWindow,

    #[error("canvas element #{0} not found")]
    CanvasNotFound(String),

    #[error("element #{0} is not a canvas")]
    NotACanvas(String),

    #[error("failed to create rendering surface: {0}")]
    SurfaceCreation(String),

    #[error("no compatible graphics adapter")]
    NoAdapter,

    #[error("failed to create graphics device: {0}")]
    DeviceCreation(String),

    #[error("shader compilation failed: {0}")]
    ShaderCompilation(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("invalid board snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_canvas() {
        let err = RenderError::CanvasNotFound("board".into());
        assert_eq!(err.to_string(), "canvas element #board not found");
        let err = RenderError::NotACanvas("hud".into());
        assert_eq!(err.to_string(), "element #hud is not a canvas");
    }

    #[test]
    fn test_snapshot_error_converts() {
        fn parse(json: &str) -> Result<crate::board::BoardSnapshot, RenderError> {
            Ok(crate::board::BoardSnapshot::from_json(json)?)
        }
        let err = parse("{ not json").unwrap_err();
        assert!(matches!(err, RenderError::InvalidSnapshot(_)));
        assert!(err.to_string().starts_with("invalid board snapshot"));
    }
}
