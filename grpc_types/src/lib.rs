//! Protobuf messages and tonic stubs for the faro `FaceRecognition` service.
//!
//! `face` holds the request/response messages, `services::face_service` the generated
//! client and server for the service itself.
pub mod face {
    tonic::include_proto!("face");
}

pub mod services {
    pub mod face_service {
        tonic::include_proto!("services.face_service");
    }
}

pub mod utils;
