use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use grpc_types::face::{
    Empty, EnrollmentDeleteRequest, EnrollmentListRequest, FaceRecord, FaceRecordList,
    FaceServiceInfo, FaceStatusRequest, GalleryDeleteRequest, GalleryList, GalleryListRequest,
};
use grpc_types::utils::add_trace_parent;
use ndarray::{Array2, ArrayView2};
use tokio::sync::watch;
use tonic::Request;

use crate::builders::face::{
    build_detect, build_detect_extract, build_detect_extract_enroll, build_detect_extract_search,
    build_enroll, build_extract, build_score, build_search, DetectExtractEnrollParams,
    DetectExtractSearchParams, DetectParams, EnrollParams, ExtractParams, SearchParams,
};
use crate::builders::Defaults;
use crate::config::{ClientOptions, RunMode};
use crate::convert::{array_to_matrix, matrix_to_array};
use crate::discovery::{resolve_address, ServiceDiscovery};
use crate::encoding::EncodeOptions;
use crate::error::FaroError;
use crate::grpc::{FaceTransport, GrpcTransport};
use crate::throttle::{AsyncJobThrottle, JobHandle};

/// Result of an operation that can run either way: `Done` when called in sync mode, `Pending`
/// when submitted through the admission throttle
#[derive(Debug)]
pub enum Reply<T> {
    Done(T),
    Pending(JobHandle<T>),
}

impl<T> Reply<T> {
    pub async fn wait(self) -> Result<T, FaroError> {
        match self {
            Reply::Done(value) => Ok(value),
            Reply::Pending(handle) => handle.await,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Reply::Pending(_))
    }
}

/// What a status probe observed
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Info(FaceServiceInfo),
    Unreachable(String),
}

fn traced<T>(message: T, tracing_id: Option<String>) -> Request<T> {
    let mut req = Request::new(message);
    add_trace_parent(&mut req, tracing_id);
    req
}

/// Client for a face recognition service.
///
/// Holds one connection, probes the service on construction and caches the thresholds it
/// reports. Those cached thresholds fill in any threshold a caller leaves out, and only change
/// when [`FaceClient::status`] succeeds again.
#[derive(Debug)]
pub struct FaceClient<T = GrpcTransport> {
    options: ClientOptions,
    transport: Arc<T>,
    throttle: AsyncJobThrottle,
    defaults: watch::Sender<Defaults>,
    ready: AtomicBool,
}

impl FaceClient<GrpcTransport> {
    /// Connects to `options.address`. A failed initial probe leaves the client constructed but
    /// not ready. `max_message_size` of `None` leaves message sizes unlimited.
    pub async fn new(
        options: ClientOptions,
        max_message_size: Option<usize>,
        timeout: Option<Duration>,
    ) -> Result<Self, FaroError> {
        if let Some(name) = &options.service_name {
            log::warn!(
                "No service discovery given, ignoring service name \"{name}\" and dialing {}",
                options.address
            );
        }
        let transport = GrpcTransport::connect_lazy(options.address.clone(), max_message_size)?;
        Ok(Self::with_transport(options, transport, timeout).await)
    }

    /// Like [`FaceClient::new`], dialing the discovered endpoint of `options.service_name` when
    /// that service is running
    pub async fn new_with_discovery(
        options: ClientOptions,
        discovery: &dyn ServiceDiscovery,
        max_message_size: Option<usize>,
        timeout: Option<Duration>,
    ) -> Result<Self, FaroError> {
        let address = resolve_address(&options, discovery).await;
        let transport = GrpcTransport::connect_lazy(address, max_message_size)?;
        Ok(Self::with_transport(options, transport, timeout).await)
    }
}

impl<T: FaceTransport> FaceClient<T> {
    pub async fn with_transport(
        options: ClientOptions,
        transport: T,
        timeout: Option<Duration>,
    ) -> Self {
        let client = Self {
            throttle: AsyncJobThrottle::new(options.effective_max_async()),
            transport: Arc::new(transport),
            defaults: watch::Sender::new(Defaults::default()),
            ready: AtomicBool::new(false),
            options,
        };
        let (ready, _) = client.status(client.options.verbose, timeout).await;
        log::debug!("Face client constructed, ready: {ready}");
        client
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Whether the most recent probe found the service ready
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Snapshot of the thresholds cached by the last successful probe
    pub fn defaults(&self) -> Defaults {
        *self.defaults.borrow()
    }

    /// Async calls admitted and not yet finished
    pub fn in_flight(&self) -> usize {
        self.throttle.in_flight()
    }

    fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            compression: self.options.compression,
            quality: self.options.quality,
        }
    }

    async fn dispatch<R, F, Fut>(&self, mode: RunMode, call: F) -> Result<Reply<R>, FaroError>
    where
        F: FnOnce(Arc<T>) -> Fut,
        Fut: Future<Output = Result<R, FaroError>> + Send + 'static,
        R: Send + 'static,
    {
        let call = call(self.transport.clone());
        match mode {
            RunMode::Sync => Ok(Reply::Done(call.await?)),
            RunMode::Async => Ok(Reply::Pending(self.throttle.submit(call).await?)),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn detect(
        &self,
        params: DetectParams,
        mode: RunMode,
        tracing_id: Option<String>,
    ) -> Result<Reply<FaceRecordList>, FaroError> {
        let request = build_detect(&params, &self.defaults(), &self.encode_options())?;
        let req = traced(request, tracing_id);
        self.dispatch(mode, |transport| async move { transport.detect(req).await })
            .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn extract(
        &self,
        params: ExtractParams,
        mode: RunMode,
        tracing_id: Option<String>,
    ) -> Result<Reply<FaceRecordList>, FaroError> {
        let request = build_extract(params, &self.encode_options())?;
        let req = traced(request, tracing_id);
        self.dispatch(mode, |transport| async move { transport.extract(req).await })
            .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn detect_extract(
        &self,
        params: DetectParams,
        mode: RunMode,
        tracing_id: Option<String>,
    ) -> Result<Reply<FaceRecordList>, FaroError> {
        let request = build_detect_extract(&params, &self.defaults(), &self.encode_options())?;
        let req = traced(request, tracing_id);
        self.dispatch(mode, |transport| async move {
            transport.detect_extract(req).await
        })
        .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn detect_extract_enroll(
        &self,
        params: DetectExtractEnrollParams,
        mode: RunMode,
        tracing_id: Option<String>,
    ) -> Result<Reply<FaceRecordList>, FaroError> {
        let request =
            build_detect_extract_enroll(&params, &self.defaults(), &self.encode_options())?;
        let req = traced(request, tracing_id);
        self.dispatch(mode, |transport| async move {
            transport.detect_extract_enroll(req).await
        })
        .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn detect_extract_search(
        &self,
        params: DetectExtractSearchParams,
        mode: RunMode,
        tracing_id: Option<String>,
    ) -> Result<Reply<FaceRecordList>, FaroError> {
        let request =
            build_detect_extract_search(&params, &self.defaults(), &self.encode_options())?;
        let req = traced(request, tracing_id);
        self.dispatch(mode, |transport| async move {
            transport.detect_extract_search(req).await
        })
        .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn enroll(
        &self,
        params: EnrollParams,
        mode: RunMode,
        tracing_id: Option<String>,
    ) -> Result<Reply<Empty>, FaroError> {
        let req = traced(build_enroll(params), tracing_id);
        self.dispatch(mode, |transport| async move { transport.enroll(req).await })
            .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn search(
        &self,
        params: SearchParams,
        mode: RunMode,
        tracing_id: Option<String>,
    ) -> Result<Reply<FaceRecordList>, FaroError> {
        let req = traced(build_search(params), tracing_id);
        self.dispatch(mode, |transport| async move { transport.search(req).await })
            .await
    }

    /// Pairwise distances between probe and gallery templates, one row per probe
    #[tracing::instrument(skip_all)]
    pub async fn score(
        &self,
        probe: &[FaceRecord],
        gallery: &[FaceRecord],
        tracing_id: Option<String>,
    ) -> Result<Array2<f32>, FaroError> {
        let req = traced(build_score(probe, gallery), tracing_id);
        matrix_to_array(self.transport.score(req).await?)
    }

    /// Sends a matrix to the service and returns what it echoes back
    pub async fn echo(
        &self,
        matrix: ArrayView2<'_, f32>,
        tracing_id: Option<String>,
    ) -> Result<Array2<f32>, FaroError> {
        let req = traced(array_to_matrix(matrix)?, tracing_id);
        matrix_to_array(self.transport.echo(req).await?)
    }

    pub async fn gallery_list(&self, tracing_id: Option<String>) -> Result<GalleryList, FaroError> {
        let req = traced(GalleryListRequest {}, tracing_id);
        self.transport.gallery_list(req).await
    }

    pub async fn gallery_delete(
        &self,
        gallery_name: impl Into<String>,
        tracing_id: Option<String>,
    ) -> Result<Empty, FaroError> {
        let req = traced(
            GalleryDeleteRequest {
                gallery_name: gallery_name.into(),
            },
            tracing_id,
        );
        self.transport.gallery_delete(req).await
    }

    /// Faces enrolled in a gallery
    pub async fn face_list(
        &self,
        gallery_name: impl Into<String>,
        tracing_id: Option<String>,
    ) -> Result<FaceRecordList, FaroError> {
        let req = traced(
            EnrollmentListRequest {
                gallery_name: gallery_name.into(),
            },
            tracing_id,
        );
        self.transport.enrollment_list(req).await
    }

    pub async fn subject_delete(
        &self,
        gallery_name: impl Into<String>,
        subject_id: impl Into<String>,
        tracing_id: Option<String>,
    ) -> Result<Empty, FaroError> {
        let req = traced(
            EnrollmentDeleteRequest {
                gallery_name: gallery_name.into(),
                subject_id: subject_id.into(),
            },
            tracing_id,
        );
        self.transport.subject_delete(req).await
    }

    pub async fn train_from_gallery(
        &self,
        gallery_name: impl Into<String>,
        tracing_id: Option<String>,
    ) -> Result<Empty, FaroError> {
        let req = traced(
            EnrollmentListRequest {
                gallery_name: gallery_name.into(),
            },
            tracing_id,
        );
        self.transport.train_from_gallery(req).await
    }

    /// Score matrix of every enrolled face in a gallery against every other
    pub async fn generate_match_distribution(
        &self,
        gallery_name: impl Into<String>,
        tracing_id: Option<String>,
    ) -> Result<Array2<f32>, FaroError> {
        let req = traced(
            EnrollmentListRequest {
                gallery_name: gallery_name.into(),
            },
            tracing_id,
        );
        matrix_to_array(self.transport.generate_match_distribution(req).await?)
    }

    /// Probes the service. Never fails: an unreachable service yields `(false, Unreachable)`
    /// and keeps the previously cached thresholds. A successful probe replaces them.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self, verbose: bool, timeout: Option<Duration>) -> (bool, ProbeOutcome) {
        let mut req = Request::new(FaceStatusRequest {});
        let probe = match timeout {
            Some(timeout) => {
                req.set_timeout(timeout);
                tokio::time::timeout(timeout, self.transport.status(req))
                    .await
                    .unwrap_or_else(|_| {
                        Err(tonic::Status::deadline_exceeded("status probe timed out").into())
                    })
            }
            None => self.transport.status(req).await,
        };
        match probe {
            Ok(info) => {
                self.defaults.send_replace(Defaults::from(&info));
                let ready = info.is_ready();
                self.ready.store(ready, Ordering::SeqCst);
                if verbose {
                    log::info!("Face service status {info:?}");
                }
                (ready, ProbeOutcome::Info(info))
            }
            Err(err) => {
                self.ready.store(false, Ordering::SeqCst);
                let message = if verbose {
                    log::warn!("Face service status probe failed: {err}");
                    format!("cannot connect: {err}")
                } else {
                    "cannot connect".to_string()
                };
                (false, ProbeOutcome::Unreachable(message))
            }
        }
    }
}
