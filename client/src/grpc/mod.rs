pub mod face;

pub use face::GrpcTransport;

use grpc_types::face::{
    DetectExtractEnrollRequest, DetectExtractRequest, DetectExtractSearchRequest, DetectRequest,
    Empty, EnrollRequest, EnrollmentDeleteRequest, EnrollmentListRequest, ExtractRequest,
    FaceRecordList, FaceServiceInfo, FaceStatusRequest, GalleryDeleteRequest, GalleryList,
    GalleryListRequest, Matrix, ScoreRequest, SearchRequest,
};
use tonic::Request;

use crate::error::FaroError;

/// Request/response channel to a face service.
///
/// One method per RPC of the `FaceRecognition` service. [`GrpcTransport`] is the tonic backed
/// implementation; anything else (test doubles, in-process workers) can stand in for it.
#[async_trait::async_trait]
pub trait FaceTransport: Send + Sync + 'static {
    async fn detect(&self, req: Request<DetectRequest>) -> Result<FaceRecordList, FaroError>;

    async fn extract(&self, req: Request<ExtractRequest>) -> Result<FaceRecordList, FaroError>;

    async fn detect_extract(
        &self,
        req: Request<DetectExtractRequest>,
    ) -> Result<FaceRecordList, FaroError>;

    async fn detect_extract_enroll(
        &self,
        req: Request<DetectExtractEnrollRequest>,
    ) -> Result<FaceRecordList, FaroError>;

    async fn detect_extract_search(
        &self,
        req: Request<DetectExtractSearchRequest>,
    ) -> Result<FaceRecordList, FaroError>;

    async fn enroll(&self, req: Request<EnrollRequest>) -> Result<Empty, FaroError>;

    async fn search(&self, req: Request<SearchRequest>) -> Result<FaceRecordList, FaroError>;

    async fn score(&self, req: Request<ScoreRequest>) -> Result<Matrix, FaroError>;

    async fn echo(&self, req: Request<Matrix>) -> Result<Matrix, FaroError>;

    async fn status(&self, req: Request<FaceStatusRequest>) -> Result<FaceServiceInfo, FaroError>;

    async fn gallery_list(&self, req: Request<GalleryListRequest>)
        -> Result<GalleryList, FaroError>;

    async fn gallery_delete(&self, req: Request<GalleryDeleteRequest>)
        -> Result<Empty, FaroError>;

    async fn enrollment_list(
        &self,
        req: Request<EnrollmentListRequest>,
    ) -> Result<FaceRecordList, FaroError>;

    async fn subject_delete(
        &self,
        req: Request<EnrollmentDeleteRequest>,
    ) -> Result<Empty, FaroError>;

    async fn train_from_gallery(
        &self,
        req: Request<EnrollmentListRequest>,
    ) -> Result<Empty, FaroError>;

    async fn generate_match_distribution(
        &self,
        req: Request<EnrollmentListRequest>,
    ) -> Result<Matrix, FaroError>;
}
