//! Case-study metadata: the per-run JSON descriptor stored next to the
//! case-study output, its parser, and the store that fetches it.
//!
//! The descriptor is a tagged union on `caseStudy`. Every variant shares the
//! same shape ([`MetadataBody`]) and differs only in the row type carried by its
//! keyframes. Images and rows that failed to materialize upstream are recorded
//! in place as [`ErrorRecord`]s.

mod parser;
mod store;


pub use parser::MetadataParser;
pub use store::KernelMetadataStore;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MetadataError;

/// Supported case studies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStudyName {
    #[serde(rename = "climate-monitoring")]
    ClimateMonitoring,
    #[serde(rename = "sentinel-5p")]
    Sentinel5p,
    #[serde(rename = "swissgrid")]
    Swissgrid,
}

impl CaseStudyName {
    /// All supported case studies.
    pub const ALL: [CaseStudyName; 3] = [
        CaseStudyName::ClimateMonitoring,
        CaseStudyName::Sentinel5p,
        CaseStudyName::Swissgrid,
    ];

    /// Wire name of the case study.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStudyName::ClimateMonitoring => "climate-monitoring",
            CaseStudyName::Sentinel5p => "sentinel-5p",
            CaseStudyName::Swissgrid => "swissgrid",
        }
    }
}

impl fmt::Display for CaseStudyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStudyName {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseStudyName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| MetadataError::UnknownCaseStudy {
                name: s.to_string(),
            })
    }
}

/// Identifies the metadata descriptor of one case-study run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKey {
    pub case_study: CaseStudyName,
    pub tracer_id: String,
    pub job_id: u64,
}

impl MetadataKey {
    pub fn new(case_study: CaseStudyName, tracer_id: impl Into<String>, job_id: u64) -> Self {
        Self {
            case_study,
            tracer_id: tracer_id.into(),
            job_id,
        }
    }

    /// Object-storage path of the descriptor.
    pub fn object_path(&self) -> String {
        format!(
            "{}/{}/{}/metadata.json",
            self.case_study, self.tracer_id, self.job_id
        )
    }
}

/// Placeholder for an image or row that failed to materialize upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub error_name: String,
    pub error_message: String,
}

/// An image produced for a keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub relative_path: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Time-limited URL, filled in by the parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_url: Option<String>,
}

/// An image slot: either the image or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    Failed(ErrorRecord),
    Image(Image),
}

/// A data row slot: either a case-study row or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowEntry<R> {
    Row(R),
    Failed(ErrorRecord),
}

/// Row of the climate-monitoring case study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateMonitoringRow {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub carbon_monoxide_level: String,
    pub temperature: f64,
}

/// Row of the Sentinel-5P case study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentinel5pRow {
    pub region: String,
    pub parameter: String,
    pub mean_concentration: f64,
    pub unit: String,
}

/// Row of the Swissgrid case study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwissgridRow {
    pub region: String,
    pub energy_kind: String,
    pub kilowatt_hours: f64,
}

/// A timestamped bundle of images and rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe<R> {
    pub timestamp: String,
    pub images: Vec<ImageEntry>,
    pub data: Vec<RowEntry<R>>,
    pub data_description: String,
}

/// Shape shared by every case-study variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataBody<R> {
    pub keyframes: Vec<Keyframe<R>>,
    pub image_kinds: Vec<String>,
    /// Object paths the agent should be given access to. Never displayed.
    pub relative_paths_for_agent: Vec<String>,
    /// Epoch millis after which signed URLs are stale.
    #[serde(default)]
    pub expiration_time: i64,
}

/// Display projection of [`MetadataBody`] without agent-only paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBody<R> {
    pub keyframes: Vec<Keyframe<R>>,
    pub image_kinds: Vec<String>,
    pub expiration_time: i64,
}

impl<R> From<MetadataBody<R>> for DisplayBody<R> {
    fn from(body: MetadataBody<R>) -> Self {
        Self {
            keyframes: body.keyframes,
            image_kinds: body.image_kinds,
            expiration_time: body.expiration_time,
        }
    }
}

impl<R> MetadataBody<R> {
    fn images_mut(&mut self) -> Vec<&mut ImageEntry> {
        self.keyframes
            .iter_mut()
            .flat_map(|keyframe| keyframe.images.iter_mut())
            .collect()
    }
}

/// Full case-study metadata, as needed by the bootstrap workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "caseStudy")]
pub enum CaseStudyMetadata {
    #[serde(rename = "climate-monitoring")]
    ClimateMonitoring(MetadataBody<ClimateMonitoringRow>),
    #[serde(rename = "sentinel-5p")]
    Sentinel5p(MetadataBody<Sentinel5pRow>),
    #[serde(rename = "swissgrid")]
    Swissgrid(MetadataBody<SwissgridRow>),
}

/// Case-study metadata safe to hand to a display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "caseStudy")]
pub enum DisplayMetadata {
    #[serde(rename = "climate-monitoring")]
    ClimateMonitoring(DisplayBody<ClimateMonitoringRow>),
    #[serde(rename = "sentinel-5p")]
    Sentinel5p(DisplayBody<Sentinel5pRow>),
    #[serde(rename = "swissgrid")]
    Swissgrid(DisplayBody<SwissgridRow>),
}

impl CaseStudyMetadata {
    pub fn case_study(&self) -> CaseStudyName {
        match self {
            CaseStudyMetadata::ClimateMonitoring(_) => CaseStudyName::ClimateMonitoring,
            CaseStudyMetadata::Sentinel5p(_) => CaseStudyName::Sentinel5p,
            CaseStudyMetadata::Swissgrid(_) => CaseStudyName::Swissgrid,
        }
    }

    pub fn relative_paths_for_agent(&self) -> &[String] {
        match self {
            CaseStudyMetadata::ClimateMonitoring(body) => &body.relative_paths_for_agent,
            CaseStudyMetadata::Sentinel5p(body) => &body.relative_paths_for_agent,
            CaseStudyMetadata::Swissgrid(body) => &body.relative_paths_for_agent,
        }
    }

    pub fn expiration_time(&self) -> i64 {
        match self {
            CaseStudyMetadata::ClimateMonitoring(body) => body.expiration_time,
            CaseStudyMetadata::Sentinel5p(body) => body.expiration_time,
            CaseStudyMetadata::Swissgrid(body) => body.expiration_time,
        }
    }

    pub fn keyframe_count(&self) -> usize {
        match self {
            CaseStudyMetadata::ClimateMonitoring(body) => body.keyframes.len(),
            CaseStudyMetadata::Sentinel5p(body) => body.keyframes.len(),
            CaseStudyMetadata::Swissgrid(body) => body.keyframes.len(),
        }
    }

    pub(crate) fn set_expiration_time(&mut self, expiration_time: i64) {
        match self {
            CaseStudyMetadata::ClimateMonitoring(body) => body.expiration_time = expiration_time,
            CaseStudyMetadata::Sentinel5p(body) => body.expiration_time = expiration_time,
            CaseStudyMetadata::Swissgrid(body) => body.expiration_time = expiration_time,
        }
    }

    /// Every image slot across all keyframes, in document order.
    pub(crate) fn images_mut(&mut self) -> Vec<&mut ImageEntry> {
        match self {
            CaseStudyMetadata::ClimateMonitoring(body) => body.images_mut(),
            CaseStudyMetadata::Sentinel5p(body) => body.images_mut(),
            CaseStudyMetadata::Swissgrid(body) => body.images_mut(),
        }
    }

    /// Drop the agent-only paths.
    pub fn into_display(self) -> DisplayMetadata {
        match self {
            CaseStudyMetadata::ClimateMonitoring(body) => {
                DisplayMetadata::ClimateMonitoring(body.into())
            }
            CaseStudyMetadata::Sentinel5p(body) => DisplayMetadata::Sentinel5p(body.into()),
            CaseStudyMetadata::Swissgrid(body) => DisplayMetadata::Swissgrid(body.into()),
        }
    }
}

impl DisplayMetadata {
    pub fn case_study(&self) -> CaseStudyName {
        match self {
            DisplayMetadata::ClimateMonitoring(_) => CaseStudyName::ClimateMonitoring,
            DisplayMetadata::Sentinel5p(_) => CaseStudyName::Sentinel5p,
            DisplayMetadata::Swissgrid(_) => CaseStudyName::Swissgrid,
        }
    }
}
