use serde::Serialize;

use crate::analysis::Analysis;

/// Response for a successful upload-and-analyze request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub msg: String,
    pub file_url: String,
    pub analysis: Analysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}
