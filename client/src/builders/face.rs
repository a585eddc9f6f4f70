use typed_builder::TypedBuilder;

use grpc_types::face::{
    DetectExtractEnrollRequest, DetectExtractRequest, DetectExtractSearchRequest, DetectOptions,
    DetectRequest, EnrollRequest, ExtractRequest, FaceRecord, FaceRecordList, ScoreRequest,
    SearchRequest, TemplateList,
};

use crate::builders::Defaults;
use crate::encoding::{encode_image, EncodeOptions, FaceImage};
use crate::error::FaroError;

pub const UNKNOWN_SOURCE: &str = "UNKNOWN_SOURCE";
pub const UNKNOWN_SUBJECT: &str = "UNKNOWN_SUBJECT";
pub const DEFAULT_GALLERY: &str = "default";
pub const DEFAULT_MAX_RESULTS: i32 = 3;

/// Inputs of a detect stage. The same params build a standalone detect request and the detect
/// stage nested inside every composite request.
#[derive(TypedBuilder, Debug, Clone)]
pub struct DetectParams {
    #[builder(setter(into))]
    pub image: FaceImage,

    #[builder(default)]
    pub best: bool,

    /// Falls back to the probed detection threshold when unset
    #[builder(default, setter(strip_option))]
    pub threshold: Option<f32>,

    #[builder(default, setter(strip_option))]
    pub min_size: Option<i32>,

    #[builder(default)]
    pub downsample: i32,

    #[builder(default, setter(strip_option, into))]
    pub source: Option<String>,

    #[builder(default, setter(strip_option, into))]
    pub subject_id: Option<String>,

    #[builder(default, setter(strip_option, into))]
    pub subject_name: Option<String>,

    #[builder(default, setter(strip_option))]
    pub frame: Option<i64>,
}

#[derive(TypedBuilder, Debug, Clone)]
pub struct ExtractParams {
    #[builder(setter(into))]
    pub image: FaceImage,

    #[builder(setter(into))]
    pub records: FaceRecordList,
}

#[derive(TypedBuilder, Debug, Clone)]
pub struct DetectExtractEnrollParams {
    pub detect: DetectParams,

    #[builder(default = DEFAULT_GALLERY.to_string(), setter(into))]
    pub enroll_gallery: String,
}

#[derive(TypedBuilder, Debug, Clone)]
pub struct DetectExtractSearchParams {
    pub detect: DetectParams,

    #[builder(default = DEFAULT_GALLERY.to_string(), setter(into))]
    pub search_gallery: String,

    #[builder(default = DEFAULT_MAX_RESULTS)]
    pub max_results: i32,

    /// Falls back to the probed match threshold when unset
    #[builder(default, setter(strip_option))]
    pub search_threshold: Option<f32>,
}

#[derive(TypedBuilder, Debug, Clone)]
pub struct EnrollParams {
    #[builder(setter(into))]
    pub faces: FaceRecordList,

    #[builder(setter(into))]
    pub enroll_gallery: String,

    /// Overwrites the subject id of every record when set
    #[builder(default, setter(strip_option, into))]
    pub subject_id: Option<String>,

    /// Overwrites the name of every record when set
    #[builder(default, setter(strip_option, into))]
    pub subject_name: Option<String>,
}

#[derive(TypedBuilder, Debug, Clone)]
pub struct SearchParams {
    #[builder(setter(into))]
    pub probes: FaceRecordList,

    #[builder(setter(into))]
    pub search_gallery: String,

    #[builder(default = DEFAULT_MAX_RESULTS)]
    pub max_results: i32,

    #[builder(default, setter(strip_option))]
    pub search_threshold: Option<f32>,
}

pub fn build_detect(
    params: &DetectParams,
    defaults: &Defaults,
    encode: &EncodeOptions,
) -> Result<DetectRequest, FaroError> {
    Ok(DetectRequest {
        image: Some(encode_image(&params.image, encode)?),
        detect_options: Some(DetectOptions {
            best: params.best,
            threshold: defaults.detection_threshold(params.threshold),
            min_size: params.min_size,
            downsample: params.downsample,
        }),
        source: params
            .source
            .clone()
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        subject_id: params
            .subject_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_SUBJECT.to_string()),
        subject_name: params.subject_name.clone(),
        frame: params.frame,
    })
}

pub fn build_extract(
    params: ExtractParams,
    encode: &EncodeOptions,
) -> Result<ExtractRequest, FaroError> {
    Ok(ExtractRequest {
        image: Some(encode_image(&params.image, encode)?),
        records: Some(params.records),
    })
}

pub fn build_detect_extract(
    params: &DetectParams,
    defaults: &Defaults,
    encode: &EncodeOptions,
) -> Result<DetectExtractRequest, FaroError> {
    Ok(DetectExtractRequest {
        detect_request: Some(build_detect(params, defaults, encode)?),
        extract_request: Some(ExtractRequest::default()),
    })
}

pub fn build_detect_extract_enroll(
    params: &DetectExtractEnrollParams,
    defaults: &Defaults,
    encode: &EncodeOptions,
) -> Result<DetectExtractEnrollRequest, FaroError> {
    Ok(DetectExtractEnrollRequest {
        detect_request: Some(build_detect(&params.detect, defaults, encode)?),
        extract_request: Some(ExtractRequest::default()),
        enroll_request: Some(EnrollRequest {
            records: None,
            enroll_gallery: params.enroll_gallery.clone(),
        }),
    })
}

pub fn build_detect_extract_search(
    params: &DetectExtractSearchParams,
    defaults: &Defaults,
    encode: &EncodeOptions,
) -> Result<DetectExtractSearchRequest, FaroError> {
    Ok(DetectExtractSearchRequest {
        detect_request: Some(build_detect(&params.detect, defaults, encode)?),
        extract_request: Some(ExtractRequest::default()),
        search_request: Some(SearchRequest {
            probes: None,
            search_gallery: params.search_gallery.clone(),
            max_results: params.max_results,
            threshold: defaults.match_threshold(params.search_threshold),
        }),
    })
}

pub fn build_enroll(params: EnrollParams) -> EnrollRequest {
    let EnrollParams {
        mut faces,
        enroll_gallery,
        subject_id,
        subject_name,
    } = params;
    for face in faces.face_records.iter_mut() {
        if let Some(subject_id) = &subject_id {
            face.subject_id.clone_from(subject_id);
        }
        if let Some(subject_name) = &subject_name {
            face.name.clone_from(subject_name);
        }
    }
    EnrollRequest {
        records: Some(faces),
        enroll_gallery,
    }
}

/// Standalone search only sends a threshold the caller chose; the cached match threshold is
/// for the detect-extract-search pipeline
pub fn build_search(params: SearchParams) -> SearchRequest {
    SearchRequest {
        threshold: params.search_threshold,
        probes: Some(params.probes),
        search_gallery: params.search_gallery,
        max_results: params.max_results,
    }
}

/// Only templates travel for scoring, one per record and in record order
pub fn build_score(probe: &[FaceRecord], gallery: &[FaceRecord]) -> ScoreRequest {
    let templates = |records: &[FaceRecord]| TemplateList {
        templates: records.iter().map(FaceRecord::template_or_empty).collect(),
    };
    ScoreRequest {
        template_probes: Some(templates(probe)),
        template_gallery: Some(templates(gallery)),
    }
}
