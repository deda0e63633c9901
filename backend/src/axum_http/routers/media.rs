use crate::{axum_http::error_responses::AppError, usecases::media_upload::MediaUploadUseCase};
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use crates::{domain::repositories::media_host::MediaHostClient, infra::staged_file::StagedFile};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};
use uuid::Uuid;

const UPLOAD_FIELD: &str = "file";

pub struct MediaState<H>
where
    H: MediaHostClient + Send + Sync + 'static,
{
    pub usecase: Arc<MediaUploadUseCase<H>>,
    pub temp_dir: PathBuf,
}

pub fn routes<H>(usecase: Arc<MediaUploadUseCase<H>>, temp_dir: PathBuf) -> Router
where
    H: MediaHostClient + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(upload_media::<H>))
        .with_state(Arc::new(MediaState { usecase, temp_dir }))
}

/// Stages the `file` part of the form under the temp dir and forwards it to
/// the media host. The staged copy is gone once this returns.
pub async fn upload_media<H>(
    State(state): State<Arc<MediaState<H>>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError>
where
    H: MediaHostClient + Send + Sync + 'static,
{
    let mut staged_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        staged_path = Some(stage_field(field, &state.temp_dir).await?);
        break;
    }

    let result = state
        .usecase
        .upload(staged_path.as_deref())
        .await
        .map_err(|err| {
            if !err.is_no_input() {
                error!(error = ?err, "media: upload request failed");
            }
            AppError::from(err)
        })?;

    Ok((StatusCode::CREATED, Json(result)))
}

async fn stage_field(mut field: Field<'_>, temp_dir: &Path) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(temp_dir)
        .await
        .with_context(|| format!("failed to create temp dir {}", temp_dir.display()))?;

    let file_name = sanitize_file_name(field.file_name().unwrap_or("upload"));
    let staged = StagedFile::new(temp_dir.join(format!("{}-{}", Uuid::new_v4(), file_name)));

    let mut file = tokio::fs::File::create(staged.path())
        .await
        .with_context(|| format!("failed to create {}", staged.path().display()))?;

    // Dropping `staged` on any early return removes the partial file.
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|err| AppError::BadRequest(err.body_text()))?
    {
        file.write_all(&chunk)
            .await
            .context("failed to write staged upload")?;
    }
    file.flush().await.context("failed to flush staged upload")?;

    debug!(local_path = %staged.path().display(), "media: upload staged");
    Ok(staged.into_path())
}

fn sanitize_file_name(raw: &str) -> String {
    let name = Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");

    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use crates::domain::{
        repositories::media_host::MockMediaHostClient, value_objects::media_upload::UploadResult,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "media-gateway-test-boundary";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                ),
            }
            body.extend_from_slice(content.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn router_with(media_host: MockMediaHostClient, temp_dir: &Path) -> Router {
        routes(
            Arc::new(MediaUploadUseCase::new(Arc::new(media_host))),
            temp_dir.to_path_buf(),
        )
    }

    fn staged_files(temp_dir: &Path) -> usize {
        std::fs::read_dir(temp_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn uploads_file_and_returns_descriptor() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut media_host = MockMediaHostClient::new();
        media_host
            .expect_ingest()
            .times(1)
            .returning(|local_path| {
                let content = std::fs::read(local_path).unwrap_or_default();
                Box::pin(async move {
                    assert_eq!(content, b"fake png bytes");
                    Ok(UploadResult::new("https://host/img/123.png", "123"))
                })
            });

        let response = router_with(media_host, temp_dir.path())
            .oneshot(multipart_request(&[
                ("title", None, "holiday"),
                ("file", Some("my photo.png"), "fake png bytes"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["url"], "https://host/img/123.png");
        assert_eq!(json["public_id"], "123");
        assert_eq!(staged_files(temp_dir.path()), 0);
    }

    #[tokio::test]
    async fn missing_file_part_is_bad_request() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut media_host = MockMediaHostClient::new();
        media_host.expect_ingest().never();

        let response = router_with(media_host, temp_dir.path())
            .oneshot(multipart_request(&[("title", None, "no file here")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn file_under_another_field_name_is_bad_request() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut media_host = MockMediaHostClient::new();
        media_host.expect_ingest().never();

        let response = router_with(media_host, temp_dir.path())
            .oneshot(multipart_request(&[("avatar", Some("a.png"), "fake png bytes")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(staged_files(temp_dir.path()), 0);
    }

    #[tokio::test]
    async fn file_field_without_filename_is_still_uploaded() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut media_host = MockMediaHostClient::new();
        media_host
            .expect_ingest()
            .times(1)
            .returning(|_| Box::pin(async { Ok(UploadResult::new("https://host/raw/9", "9")) }));

        let response = router_with(media_host, temp_dir.path())
            .oneshot(multipart_request(&[("file", None, "raw bytes")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(staged_files(temp_dir.path()), 0);
    }

    #[tokio::test]
    async fn host_failure_is_bad_gateway_and_cleans_up() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut media_host = MockMediaHostClient::new();
        media_host
            .expect_ingest()
            .times(1)
            .returning(|_| Box::pin(async { Err(anyhow::anyhow!("simulated network error")) }));

        let response = router_with(media_host, temp_dir.path())
            .oneshot(multipart_request(&[("file", Some("broken.mp4"), "mp4")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 502);
        assert!(!json["message"].as_str().unwrap().contains("simulated"));
        assert_eq!(staged_files(temp_dir.path()), 0);
    }

    #[test]
    fn sanitizes_client_file_names() {
        assert_eq!(sanitize_file_name("my photo.png"), "my_photo.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }
}
