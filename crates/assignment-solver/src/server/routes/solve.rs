//! Assignment question endpoint

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AnswerResponse, UploadedFile};

/// POST /api/ - multipart `question` (required) and `file` (optional)
pub async fn solve_assignment(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AnswerResponse>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("solve", %request_id);

    async move {
        let mut multipart =
            multipart.map_err(|e| Error::bad_request(format!("Expected a multipart form: {}", e)))?;
        let (question, file) = read_form(&mut multipart).await?;

        tracing::info!(
            "Question received ({} chars, file: {})",
            question.len(),
            file.as_ref().map(|f| f.filename.as_str()).unwrap_or("none")
        );

        let resolution = state.resolver().resolve(&question, file).await?;
        Ok(Json(AnswerResponse::from(resolution)))
    }
    .instrument(span)
    .await
}

/// Pull the `question` and `file` fields out of the form
async fn read_form(multipart: &mut Multipart) -> Result<(String, Option<UploadedFile>)> {
    let mut question = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "question" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::bad_request(format!("Failed to read question: {}", e)))?;
                question = Some(text);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::bad_request(format!("Failed to read file: {}", e)))?;

                // Browsers send an empty, unnamed part when no file was chosen
                if filename.is_empty() && data.is_empty() {
                    continue;
                }

                let filename = if filename.is_empty() {
                    format!("upload_{}.bin", Uuid::new_v4())
                } else {
                    filename
                };
                file = Some(UploadedFile::new(filename, content_type, data));
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let question =
        question.ok_or_else(|| Error::bad_request("missing required form field 'question'"))?;
    Ok((question, file))
}
