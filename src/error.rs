use thiserror::Error;

/// Errors raised while building the scene description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("height map row {row} has {found} cells, expected {expected}")]
    RaggedHeightMap { row: usize, expected: usize, found: usize },
}

/// Errors raised while loading the cube texture
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read texture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to fetch texture {path}: {reason}")]
    Fetch { path: String, reason: String },
}

/// Fatal GPU setup and rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),
    #[error("pipeline creation failed: {0}")]
    PipelineLink(String),
    #[error("failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}

impl RenderError {
    /// Whether the application cannot continue after this error. Of the
    /// per-frame surface errors only running out of memory is fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            RenderError::Frame(e) => matches!(e, wgpu::SurfaceError::OutOfMemory),
            _ => true,
        }
    }
}

/// Any error that aborts startup
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_surfaces_are_recoverable() {
        assert!(!RenderError::Frame(wgpu::SurfaceError::Lost).is_fatal());
        assert!(!RenderError::Frame(wgpu::SurfaceError::Outdated).is_fatal());
        assert!(!RenderError::Frame(wgpu::SurfaceError::Timeout).is_fatal());
        assert!(!RenderError::Frame(wgpu::SurfaceError::Other).is_fatal());
        assert!(RenderError::Frame(wgpu::SurfaceError::OutOfMemory).is_fatal());
        assert!(RenderError::ShaderCompile("bad".into()).is_fatal());
    }

    #[test]
    fn startup_error_is_transparent() {
        let err: StartupError = SceneError::RaggedHeightMap { row: 2, expected: 4, found: 3 }.into();
        assert_eq!(err.to_string(), "height map row 2 has 3 cells, expected 4");
    }
}
