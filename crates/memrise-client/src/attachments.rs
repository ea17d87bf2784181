use crate::{describe, MemriseClient};
use memrise_model::{AttachmentId, AudioClip, Error, Result, Word};
use reqwest::multipart::{Form, Part};

const DELETE_PATH: &str = "/ajax/thing/column/delete_from/";
const UPLOAD_PATH: &str = "/ajax/thing/cell/upload_file/";

impl MemriseClient {
    /// Remove one audio file from a word's audio cell.
    pub async fn delete_audio(&self, word: &Word, attachment: &AttachmentId) -> Result<()> {
        let csrf = self.require_csrf()?;
        let thing_id = word.thing_id.to_string();
        let form = [
            ("thing_id", thing_id.as_str()),
            ("column_key", word.audio_column.as_str()),
            ("cell_type", "column"),
            ("file_id", attachment.0.as_str()),
            ("csrfmiddlewaretoken", csrf.as_str()),
        ];

        let url = self.url(DELETE_PATH)?;
        let response = self
            .http
            .post(url.clone())
            .header(reqwest::header::REFERER, self.referer("/course"))
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Upload(describe(&e, &url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upload(format!(
                "deleting audio {attachment} of '{}' returned HTTP {status}",
                word.target_text
            )));
        }
        tracing::debug!(thing_id = word.thing_id, file_id = %attachment, "Deleted audio");
        Ok(())
    }

    /// Upload a clip into a word's audio cell as a multipart form.
    pub async fn upload_audio(&self, word: &Word, clip: &AudioClip) -> Result<()> {
        let csrf = self.require_csrf()?;
        let part = Part::bytes(clip.data.clone())
            .file_name(clip.file_name())
            .mime_str(clip.encoding.mime_type())
            .map_err(|e| Error::Upload(format!("invalid audio MIME type: {e}")))?;
        let form = Form::new()
            .text("thing_id", word.thing_id.to_string())
            .text("cell_id", word.audio_column.clone())
            .text("cell_type", "column")
            .text("csrfmiddlewaretoken", csrf)
            .part("f", part);

        let url = self.url(UPLOAD_PATH)?;
        let response = self
            .http
            .post(url.clone())
            .header(reqwest::header::REFERER, self.referer("/course"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upload(describe(&e, &url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upload(format!(
                "uploading audio for '{}' returned HTTP {status}",
                word.target_text
            )));
        }
        tracing::debug!(thing_id = word.thing_id, bytes = clip.len(), "Uploaded audio");
        Ok(())
    }

    fn require_csrf(&self) -> Result<String> {
        self.csrf_token()
            .ok_or_else(|| Error::Authentication("not logged in (no csrftoken cookie)".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub;
    use crate::DEFAULT_TIMEOUT;
    use axum::http::{Method, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use memrise_model::AudioEncoding;
    use serde_json::json;

    /// Client against a local server, carrying the session's csrftoken.
    async fn session_client(upload_status: StatusCode) -> (MemriseClient, stub::Requests) {
        let app = Router::new()
            .route(DELETE_PATH, post(|| async { Json(json!({"success": true})) }))
            .route(
                UPLOAD_PATH,
                post(move || async move { (upload_status, Json(json!({"success": true}))) }),
            );
        let (base, requests) = stub::serve(app).await;
        let client = MemriseClient::with_base_url(&base, DEFAULT_TIMEOUT).unwrap();
        client
            .cookies
            .add_cookie_str("csrftoken=xyz; Path=/", &client.base_url);
        (client, requests)
    }

    fn word() -> Word {
        Word {
            thing_id: 1001,
            target_text: "bonjour".into(),
            source_text: Some("hello".into()),
            audio_column: "3".into(),
            attachments: vec![AttachmentId::from("1")],
        }
    }

    #[tokio::test]
    async fn test_upload_requires_session() {
        let client = MemriseClient::with_base_url("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let clip = AudioClip::new(vec![0xff, 0xfb], AudioEncoding::Mp3);
        let err = client.upload_audio(&word(), &clip).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_delete_transport_failure_is_upload_error() {
        let base = url::Url::parse("http://127.0.0.1:9").unwrap();
        let client = MemriseClient::with_base_url(base.as_str(), DEFAULT_TIMEOUT).unwrap();
        client.cookies.add_cookie_str("csrftoken=xyz; Path=/", &base);
        let err = client
            .delete_audio(&word(), &AttachmentId::from("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
    }

    #[tokio::test]
    async fn test_delete_form_fields() {
        let (client, requests) = session_client(StatusCode::OK).await;
        client
            .delete_audio(&word(), &AttachmentId::from("1"))
            .await
            .unwrap();

        let seen = requests.all();
        assert_eq!(seen.len(), 1);
        let req = &seen[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, DELETE_PATH);
        assert!(req.header("referer").unwrap_or_default().ends_with("/course"));
        assert_eq!(
            req.body,
            "thing_id=1001&column_key=3&cell_type=column&file_id=1&csrfmiddlewaretoken=xyz"
        );
    }

    #[tokio::test]
    async fn test_upload_multipart_fields() {
        let (client, requests) = session_client(StatusCode::OK).await;
        let clip = AudioClip::new(b"ID3-mp3-bytes".to_vec(), AudioEncoding::Mp3);
        client.upload_audio(&word(), &clip).await.unwrap();

        let seen = requests.all();
        let req = &seen[0];
        assert_eq!(req.path, UPLOAD_PATH);
        assert!(req
            .header("content-type")
            .unwrap_or_default()
            .starts_with("multipart/form-data; boundary="));
        for field in [
            "name=\"thing_id\"\r\n\r\n1001\r\n",
            "name=\"cell_id\"\r\n\r\n3\r\n",
            "name=\"cell_type\"\r\n\r\ncolumn\r\n",
            "name=\"csrfmiddlewaretoken\"\r\n\r\nxyz\r\n",
            "name=\"f\"; filename=\"audio.mp3\"",
            "Content-Type: audio/mp3",
            "ID3-mp3-bytes",
        ] {
            assert!(req.body.contains(field), "missing {field:?} in {}", req.body);
        }
    }

    #[tokio::test]
    async fn test_upload_rejected_is_upload_error() {
        let (client, _) = session_client(StatusCode::FORBIDDEN).await;
        let clip = AudioClip::new(vec![1, 2, 3], AudioEncoding::Mp3);
        let err = client.upload_audio(&word(), &clip).await.unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
    }
}
