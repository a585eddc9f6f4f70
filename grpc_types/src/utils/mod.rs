use crate::face::{FaceRecord, FaceRecordList, FaceServiceInfo, Matrix, ServiceStatus, Vector};

pub static TRACE_HEADER: &str = "faro-trace-id";

/// Attaches the caller's tracing id to the outgoing request metadata. Ids that are not valid
/// ascii header values are dropped rather than failing the call.
pub fn add_trace_parent<T>(req: &mut tonic::Request<T>, tracing_id: Option<String>) {
    if let Some(trace_parent) = tracing_id {
        match trace_parent.parse() {
            Ok(value) => {
                req.metadata_mut().insert(TRACE_HEADER, value);
            }
            Err(_) => log::debug!("Dropping non ascii tracing id {trace_parent}"),
        }
    };
}

impl FaceServiceInfo {
    pub fn is_ready(&self) -> bool {
        self.status() == ServiceStatus::Ready
    }
}

impl Matrix {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.max(0) as usize, self.cols.max(0) as usize)
    }
}

impl FaceRecord {
    /// The record's template, or an empty one when extraction has not filled it in.
    pub fn template_or_empty(&self) -> Vector {
        self.template.clone().unwrap_or_default()
    }
}

impl From<Vec<FaceRecord>> for FaceRecordList {
    fn from(face_records: Vec<FaceRecord>) -> Self {
        Self { face_records }
    }
}

impl FaceRecordList {
    pub fn len(&self) -> usize {
        self.face_records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.face_records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_parent_is_added_to_metadata() {
        let mut req = tonic::Request::new(());
        add_trace_parent(&mut req, Some("abc-123".to_string()));
        assert_eq!(
            req.metadata()
                .get(TRACE_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some("abc-123")
        );
    }

    #[test]
    fn test_invalid_trace_parent_is_skipped() {
        let mut req = tonic::Request::new(());
        add_trace_parent(&mut req, Some("bad\nvalue".to_string()));
        assert!(req.metadata().get(TRACE_HEADER).is_none());

        add_trace_parent(&mut req, None);
        assert!(req.metadata().is_empty());
    }

    #[test]
    fn test_info_readiness() {
        let mut info = FaceServiceInfo::default();
        assert!(!info.is_ready());
        info.set_status(ServiceStatus::Ready);
        assert!(info.is_ready());
        info.set_status(ServiceStatus::NotReady);
        assert!(!info.is_ready());
    }

    #[test]
    fn test_matrix_shape_clamps_negative_dimensions() {
        let matrix = Matrix {
            rows: -1,
            cols: 3,
            data: vec![],
        };
        assert_eq!(matrix.shape(), (0, 3));
    }
}
