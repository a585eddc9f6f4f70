use grpc_types::face::{
    DetectExtractEnrollRequest, DetectExtractRequest, DetectExtractSearchRequest, DetectRequest,
    Empty, EnrollRequest, EnrollmentDeleteRequest, EnrollmentListRequest, ExtractRequest,
    FaceRecordList, FaceServiceInfo, FaceStatusRequest, GalleryDeleteRequest, GalleryList,
    GalleryListRequest, Matrix, ScoreRequest, SearchRequest,
};
use grpc_types::services::face_service::face_recognition_client::FaceRecognitionClient;
use tonic::transport::Channel;
use tonic::Request;

use crate::error::FaroError;
use crate::grpc::FaceTransport;

/// Prefixes bare `host:port` addresses with a scheme so tonic accepts them
pub fn normalize_address(addr: String) -> String {
    if !(addr.starts_with("https://") || addr.starts_with("http://")) {
        format!("http://{addr}")
    } else {
        addr
    }
}

// GRPC transport for the face service
//
// The generated client needs &mut to send a request, however `Channel` is a
// `tower_buffer::Buffer` underneath so cloning it is cheap and multiplexes onto the same
// connection. Every call clones the client, which keeps the transport shareable across the
// tasks the admission throttle spawns.
// https://docs.rs/tonic/latest/tonic/transport/struct.Channel.html#multiplexing-requests
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    client: FaceRecognitionClient<Channel>,
}

impl GrpcTransport {
    /// Builds a channel that connects on first use. An unreachable service therefore shows up
    /// as a failed call rather than a failed construction.
    ///
    /// `max_message_size` caps both directions; `None` lifts tonic's 4 MiB default so large
    /// score matrices and images go through.
    pub fn connect_lazy(addr: String, max_message_size: Option<usize>) -> Result<Self, FaroError> {
        let channel = Channel::from_shared(normalize_address(addr))?.connect_lazy();
        let limit = max_message_size.unwrap_or(usize::MAX);
        let client = FaceRecognitionClient::new(channel)
            .max_decoding_message_size(limit)
            .max_encoding_message_size(limit);
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl FaceTransport for GrpcTransport {
    async fn detect(&self, req: Request<DetectRequest>) -> Result<FaceRecordList, FaroError> {
        Ok(self.client.clone().detect(req).await?.into_inner())
    }

    async fn extract(&self, req: Request<ExtractRequest>) -> Result<FaceRecordList, FaroError> {
        Ok(self.client.clone().extract(req).await?.into_inner())
    }

    async fn detect_extract(
        &self,
        req: Request<DetectExtractRequest>,
    ) -> Result<FaceRecordList, FaroError> {
        Ok(self.client.clone().detect_extract(req).await?.into_inner())
    }

    async fn detect_extract_enroll(
        &self,
        req: Request<DetectExtractEnrollRequest>,
    ) -> Result<FaceRecordList, FaroError> {
        Ok(self
            .client
            .clone()
            .detect_extract_enroll(req)
            .await?
            .into_inner())
    }

    async fn detect_extract_search(
        &self,
        req: Request<DetectExtractSearchRequest>,
    ) -> Result<FaceRecordList, FaroError> {
        Ok(self
            .client
            .clone()
            .detect_extract_search(req)
            .await?
            .into_inner())
    }

    async fn enroll(&self, req: Request<EnrollRequest>) -> Result<Empty, FaroError> {
        Ok(self.client.clone().enroll(req).await?.into_inner())
    }

    async fn search(&self, req: Request<SearchRequest>) -> Result<FaceRecordList, FaroError> {
        Ok(self.client.clone().search(req).await?.into_inner())
    }

    async fn score(&self, req: Request<ScoreRequest>) -> Result<Matrix, FaroError> {
        Ok(self.client.clone().score(req).await?.into_inner())
    }

    async fn echo(&self, req: Request<Matrix>) -> Result<Matrix, FaroError> {
        Ok(self.client.clone().echo(req).await?.into_inner())
    }

    async fn status(&self, req: Request<FaceStatusRequest>) -> Result<FaceServiceInfo, FaroError> {
        Ok(self.client.clone().status(req).await?.into_inner())
    }

    async fn gallery_list(
        &self,
        req: Request<GalleryListRequest>,
    ) -> Result<GalleryList, FaroError> {
        Ok(self.client.clone().gallery_list(req).await?.into_inner())
    }

    async fn gallery_delete(
        &self,
        req: Request<GalleryDeleteRequest>,
    ) -> Result<Empty, FaroError> {
        Ok(self.client.clone().gallery_delete(req).await?.into_inner())
    }

    async fn enrollment_list(
        &self,
        req: Request<EnrollmentListRequest>,
    ) -> Result<FaceRecordList, FaroError> {
        Ok(self.client.clone().enrollment_list(req).await?.into_inner())
    }

    async fn subject_delete(
        &self,
        req: Request<EnrollmentDeleteRequest>,
    ) -> Result<Empty, FaroError> {
        Ok(self.client.clone().subject_delete(req).await?.into_inner())
    }

    async fn train_from_gallery(
        &self,
        req: Request<EnrollmentListRequest>,
    ) -> Result<Empty, FaroError> {
        Ok(self
            .client
            .clone()
            .train_from_gallery(req)
            .await?
            .into_inner())
    }

    async fn generate_match_distribution(
        &self,
        req: Request<EnrollmentListRequest>,
    ) -> Result<Matrix, FaroError> {
        Ok(self
            .client
            .clone()
            .generate_match_distribution(req)
            .await?
            .into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalization() {
        assert_eq!(
            normalize_address("localhost:50030".to_string()),
            "http://localhost:50030"
        );
        assert_eq!(
            normalize_address("https://faro.internal:443".to_string()),
            "https://faro.internal:443"
        );
    }

    #[tokio::test]
    async fn test_malformed_address_is_rejected() {
        let err = GrpcTransport::connect_lazy("bad host:1".to_string(), None).unwrap_err();
        assert!(matches!(err, FaroError::InvalidURI(_)));
    }
}
