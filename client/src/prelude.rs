pub use crate::builders::face::{
    DetectExtractEnrollParams, DetectExtractSearchParams, DetectParams, EnrollParams,
    ExtractParams, SearchParams,
};
pub use crate::builders::Defaults;
pub use crate::client::{FaceClient, ProbeOutcome, Reply};
pub use crate::config::{ClientOptions, Compression, RunMode};
pub use crate::discovery::{ServiceDiscovery, ServiceRecord, StaticDiscovery};
pub use crate::encoding::{FaceImage, FrameSource};
pub use crate::error::FaroError;
pub use crate::grpc::{FaceTransport, GrpcTransport};
pub use crate::throttle::JobHandle;
pub use grpc_types::face::{
    Detection, Empty, FaceRecord, FaceRecordList, FaceServiceInfo, GalleryInfo, GalleryList,
    Rect, ServiceStatus, Vector,
};
