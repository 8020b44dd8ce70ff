use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{error, info};

use crate::analysis::AnalysisOutcome;
use crate::error::ApiError;
use crate::state::AppState;

const PDF: &str = "application/pdf";
const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Server-side allowlist. Client-side checks gate the UI only; anything can
/// post to the endpoint directly, so the declared content type is re-checked
/// here before a single byte reaches the blob store.
pub fn is_allowed_resume_type(content_type: &str) -> bool {
    content_type == PDF || content_type == DOCX
}

/// Strip anything outside `[A-Za-z0-9._-]` from a client-supplied filename so
/// it is safe to embed in an object key.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}

/// Object key: upload timestamp plus the original filename. Two uploads of
/// the same filename in the same millisecond collide; keys are not namespaced
/// per user.
pub fn storage_key(filename: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("resumes/{}-{}", millis, sanitize_filename(filename))
}

/// The upload pipeline: store the blob, derive its public URL, hand the URL
/// to the analysis service. The blob write and its compensating delete form
/// one unit — if analysis fails after a successful write, the blob is removed
/// (best effort) before the error propagates, so a failed request leaves no
/// orphan behind.
pub async fn upload_and_analyze(
    state: &AppState,
    filename: &str,
    content_type: &str,
    body: Bytes,
) -> Result<(String, AnalysisOutcome), ApiError> {
    if !is_allowed_resume_type(content_type) {
        return Err(ApiError::validation("Only PDF or DOCX files are allowed"));
    }

    let key = storage_key(filename);

    state
        .storage
        .put_object(&key, body, content_type)
        .await
        .map_err(ApiError::Upstream)?;

    let file_url = state.storage.public_url(&key);

    match state.analysis.analyze(&file_url).await {
        Ok(outcome) => {
            info!(%key, careers = outcome.analysis.suggested_careers.len(), "resume analyzed");
            Ok((file_url, outcome))
        }
        Err(e) => {
            if let Err(del) = state.storage.delete_object(&key).await {
                error!(error = %del, %key, "failed to delete blob after analysis failure");
            }
            Err(ApiError::Upstream(e.into()))
        }
    }
}
