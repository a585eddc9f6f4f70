pub mod face;

use grpc_types::face::FaceServiceInfo;

/// Thresholds reported by the last successful status probe.
///
/// Builders never read client state directly, they are handed one of these snapshots so the
/// dependency on the probe is explicit. A field is `None` until a probe has succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Defaults {
    pub detection_threshold: Option<f32>,
    pub match_threshold: Option<f32>,
}

impl Defaults {
    pub fn detection_threshold(&self, explicit: Option<f32>) -> Option<f32> {
        explicit.or(self.detection_threshold)
    }

    pub fn match_threshold(&self, explicit: Option<f32>) -> Option<f32> {
        explicit.or(self.match_threshold)
    }
}

impl From<&FaceServiceInfo> for Defaults {
    fn from(info: &FaceServiceInfo) -> Self {
        Self {
            detection_threshold: Some(info.detection_threshold),
            match_threshold: Some(info.match_threshold),
        }
    }
}
