use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaroError {
    #[error("Invalid argument {0}")]
    InvalidArgument(String),
    #[error("Image conversion failed {0}")]
    ImageConversion(String),
    #[error("Invalid URI {0}")]
    InvalidURI(#[from] http::uri::InvalidUri),
    #[error("Transport issues with tonic {0}")]
    Tonic(#[from] tonic::transport::Error),
    #[error("Server error {0}")]
    ServerError(#[from] tonic::Status),
    #[error("Malformed response {0}")]
    MalformedResponse(String),
    #[error("Async job did not run to completion {0}")]
    JobAborted(#[from] tokio::task::JoinError),
}

impl FaroError {
    /// Errors raised by the channel, the remote service or the async job carrying a call,
    /// rather than by the caller's inputs
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FaroError::InvalidURI(_)
                | FaroError::Tonic(_)
                | FaroError::ServerError(_)
                | FaroError::JobAborted(_)
        )
    }
}

impl From<image::ImageError> for FaroError {
    fn from(input: image::ImageError) -> FaroError {
        FaroError::ImageConversion(input.to_string())
    }
}

impl From<ndarray::ShapeError> for FaroError {
    fn from(input: ndarray::ShapeError) -> FaroError {
        FaroError::ImageConversion(input.to_string())
    }
}
