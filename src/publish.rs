use anyhow::Result;
use chrono::Local;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::config::PublishConfig;
use crate::error::BlogError;
use crate::post::Document;

pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `<prefix>_<YYYYMMDD_HHMMSS>.txt` for the current local time.
pub fn timestamped_filename(prefix: &str) -> String {
    format!("{}_{}.txt", prefix, Local::now().format(FILE_TIMESTAMP_FORMAT))
}

/// Writes posts as UTF-8 text files under one directory.
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn save(&self, document: &Document, filename: Option<&str>) -> Result<PathBuf> {
        document.validate()?;

        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir)?;
            info!(dir = %self.output_dir.display(), "Created output directory");
        }

        let filename = match filename {
            Some(name) => name.to_string(),
            None => timestamped_filename("tennis_blog_post"),
        };
        let path = self.output_dir.join(filename);

        fs::write(&path, document.render())?;
        info!(path = %path.display(), title = %document.title, "Blog post saved");

        Ok(path)
    }
}

#[derive(Serialize)]
struct PublishPayload<'a> {
    title: &'a str,
    content: String,
    category: &'a str,
    tags: &'a [String],
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    article: PublishedArticle,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PublishedArticle {
    #[serde(default)]
    pub id: serde_json::Value,
    pub title: String,
    #[serde(default)]
    pub slug: String,
}

/// Posts documents to the site's article API.
pub struct Publisher {
    client: Client,
    endpoint: String,
}

impl Publisher {
    pub fn new(config: &PublishConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns whether the endpoint accepted the post. Failures are logged, never retried.
    pub async fn publish(&self, document: &Document) -> bool {
        info!(title = %document.title, endpoint = %self.endpoint, "Publishing post");

        match self.try_publish(document).await {
            Ok(Some(article)) => {
                info!(title = %article.title, slug = %article.slug, id = %article.id, "Post published");
                true
            }
            Ok(None) => {
                info!(title = %document.title, "Post published, response had no article details");
                true
            }
            Err(e) => {
                error!(title = %document.title, error = %e, "Failed to publish post");
                false
            }
        }
    }

    async fn try_publish(&self, document: &Document) -> Result<Option<PublishedArticle>> {
        document.validate()?;

        let payload = PublishPayload {
            title: &document.title,
            content: document.body(),
            category: &document.meta.category,
            tags: &document.meta.tags,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BlogError::PublishFailure(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(BlogError::PublishStatus { status, body }.into());
        }

        Ok(serde_json::from_str::<PublishResponse>(&body).ok().map(|r| r.article))
    }
}
