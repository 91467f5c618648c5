//! Retrieval of generated media (image, TTS audio) referenced by an
//! analysis result. Downloads land in the user cache dir; playback and
//! display are left to whatever the user points at that directory.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use reqwest::Client;

#[derive(Clone)]
pub struct MediaClient {
    client: Client,
    base_url: String,
}

impl MediaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the generated image for an analysis. The `t` parameter is a
    /// timestamp cache-buster; the backend serves a fresh image per run
    /// under a reused path.
    pub async fn fetch_image(&self, image_path: &str) -> Result<PathBuf> {
        let url = format!("{}/get_image", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&image_query(image_path))
            .send()
            .await?;
        self.save(response, "image.jpg").await
    }

    /// Fetch the generated speech audio for an analysis.
    pub async fn fetch_audio(&self, audio_path: &str) -> Result<PathBuf> {
        let url = format!("{}/get_audio", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("audio_path", audio_path)])
            .send()
            .await?;
        self.save(response, "speech.mp3").await
    }

    async fn save(&self, response: reqwest::Response, file_name: &str) -> Result<PathBuf> {
        if !response.status().is_success() {
            return Err(anyhow!(
                "media request failed with status: {}",
                response.status()
            ));
        }

        let bytes = response.bytes().await?;
        let dir = cache_dir()?;
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

fn cache_dir() -> Result<PathBuf> {
    let dir = dirs::cache_dir().ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(dir.join("analyzer-tui"))
}

fn image_query(image_path: &str) -> [(String, String); 2] {
    [
        ("image_path".to_string(), image_path.to_string()),
        ("t".to_string(), unix_millis().to_string()),
    ]
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
