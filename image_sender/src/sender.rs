use std::path::Path;

use anyhow::{bail, Context, Result};
use common::protocol::{ErrorResponse, PredictResponse};
use reqwest::{multipart, Client};

/// Client of the `/predict_form` endpoint.
pub struct ImageSender {
    client: Client,
    url: String,
}

impl ImageSender {
    /// Create a sender for the server listening on `address`, e.g. `127.0.0.1:3000`.
    pub fn new(address: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("http://{address}/predict_form"),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Upload a JPEG file and return the server's prediction.
    pub async fn classify_file(&self, path: &Path) -> Result<PredictResponse> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_owned());

        log::debug!("Uploading {} ({} bytes)", &file_name, data.len());

        let part = multipart::Part::bytes(data)
            .file_name(file_name)
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("image", part);

        let resp = self.client.post(&self.url).multipart(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let error = resp
                .json::<ErrorResponse>()
                .await
                .unwrap_or_else(|_| ErrorResponse::new("no error details"));
            bail!("server responded with {status}: {}", error.error);
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod test {
    use super::ImageSender;

    #[test]
    fn test_url() {
        let sender = ImageSender::new("127.0.0.1:3000");
        assert_eq!(sender.url(), "http://127.0.0.1:3000/predict_form");
    }
}
