//! A rust client for talking to a faro face recognition service
//!
//! Ships primarily the client, builders, config and error submodules
//!
//! ## Running pipelines
//!
//! Every image operation (detect, extract, the detect-extract composites, enroll and search)
//! takes a [`RunMode`](config::RunMode). `Sync` waits for the reply, `Async` submits the call
//! and hands back a pending job. Thresholds left out by the caller are filled from the last
//! successful status probe.
//!
//! ```no_run
//! use faro_client_rs::prelude::*;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), FaroError> {
//! let client =
//!     FaceClient::new(ClientOptions::default(), None, Some(Duration::from_secs(5))).await?;
//! let params = DetectParams::builder()
//!     .image(ndarray::Array3::<u8>::zeros((480, 640, 3)))
//!     .source("lobby-camera")
//!     .build();
//! let faces = client.detect(params, RunMode::Sync, None).await?.wait().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Bounded asynchronous calls
//!
//! A client never has more than `max_async` asynchronous calls in flight. Once that many are
//! outstanding, the next async submission waits until one of them finishes; nothing is
//! dropped. Replies arrive in whatever order the service completes them.
//!
//! ```no_run
//! use faro_client_rs::prelude::*;
//!
//! # async fn run(client: FaceClient, frames: Vec<ndarray::Array3<u8>>) -> Result<(), FaroError> {
//! let mut pending = Vec::new();
//! for (index, frame) in frames.into_iter().enumerate() {
//!     let params = DetectExtractEnrollParams::builder()
//!         .detect(
//!             DetectParams::builder()
//!                 .image(frame)
//!                 .frame(index as i64)
//!                 .subject_id("S1")
//!                 .build(),
//!         )
//!         .enroll_gallery("staff")
//!         .build();
//!     pending.push(client.detect_extract_enroll(params, RunMode::Async, None).await?);
//! }
//! for reply in pending {
//!     reply.wait().await?;
//! }
//! # Ok(())
//! # }
//! ```
pub mod builders;
pub mod client;
pub mod config;
pub mod convert;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod grpc;
pub mod prelude;
pub mod throttle;
