use anyhow::Result;
use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rusqlite::Connection;
use std::time::Duration;
use tracing::{info, warn};

use crate::assemble::Assembler;
use crate::backend::ContentBackend;
use crate::catalog::{CatalogLoader, CatalogRecord};
use crate::config::{Config, SiteConfig};
use crate::db::{self, PostRecord};
use crate::post::Document;
use crate::publish::{FILE_TIMESTAMP_FORMAT, FileSink, Publisher, timestamped_filename};
use crate::scheduler::SlotHandler;
use crate::theme::{self, Bucket, Theme};

pub const BATCH_PAUSE: Duration = Duration::from_secs(2);

/// Owns everything a post needs and decides where finished posts go.
pub struct BlogGenerator {
    loader: CatalogLoader,
    catalog: Vec<CatalogRecord>,
    backend: ContentBackend,
    rng: StdRng,
    site: SiteConfig,
    sink: FileSink,
    publisher: Option<Publisher>,
    ledger: Option<Connection>,
}

impl BlogGenerator {
    /// Loads the catalog once. With `publish` set, posts go to the endpoint instead of files.
    pub async fn new(config: &Config, publish: bool) -> Result<Self> {
        let publisher = if publish {
            Some(Publisher::new(&config.publish)?)
        } else {
            None
        };

        let mut generator = Self {
            loader: CatalogLoader::new(&config.catalog_url),
            catalog: Vec::new(),
            backend: ContentBackend::from_config(config.backend.as_ref()),
            rng: StdRng::from_os_rng(),
            site: config.site.clone(),
            sink: FileSink::new(&config.output_dir),
            publisher,
            ledger: open_ledger(&config.ledger_path),
        };
        generator.refresh_catalog().await;

        info!(
            backend = generator.backend.describe(),
            rackets = generator.catalog.len(),
            destination = %generator.destination(),
            "Blog generator ready"
        );

        Ok(generator)
    }

    pub fn catalog(&self) -> &[CatalogRecord] {
        &self.catalog
    }

    pub async fn refresh_catalog(&mut self) {
        let loaded = self.loader.load().await;
        if loaded.is_fallback() {
            warn!(count = loaded.get().len(), "Generating from embedded rackets");
        }
        self.catalog = loaded.into_inner();
    }

    /// Builds a post for `theme_id`, or a random registered theme when none is given.
    pub async fn generate(&mut self, theme_id: Option<&str>) -> Document {
        let theme = theme::resolve(theme_id, &mut self.rng);
        self.generate_theme(&theme).await
    }

    async fn generate_theme(&mut self, theme: &Theme) -> Document {
        info!(theme = %theme, "Generating blog post");

        let assembler = Assembler::new(&self.backend, &self.site);
        let document = assembler.assemble(theme, &self.catalog, &mut self.rng).await;

        info!(
            title = %document.title,
            sections = document.sections.len(),
            degraded = document.meta.degraded,
            "Blog post generated"
        );
        document
    }

    /// Generates one post and delivers it. Returns whether delivery succeeded.
    pub async fn generate_and_deliver(&mut self, theme_id: Option<&str>) -> bool {
        let document = self.generate(theme_id).await;
        self.deliver(&document, None).await
    }

    /// One post for a time slot, saved as `<bucket>_blog_<timestamp>.txt`.
    pub async fn generate_for_slot(&mut self, bucket: Bucket) -> bool {
        let theme = bucket.pick_theme(&mut self.rng);
        info!(bucket = %bucket, theme = %theme, "Generating slot post");

        let document = self.generate_theme(&theme).await;
        let filename = timestamped_filename(&format!("{}_blog", bucket.name()));
        self.deliver(&document, Some(&filename)).await
    }

    /// `count` random-theme posts with a short pause between them. Returns the number delivered.
    pub async fn generate_batch(&mut self, count: usize) -> usize {
        let mut delivered = 0;

        for i in 0..count {
            info!(post = i + 1, of = count, "Batch post");
            if self.generate_and_deliver(None).await {
                delivered += 1;
            }
            if i + 1 < count {
                tokio::time::sleep(BATCH_PAUSE).await;
            }
        }

        info!(delivered, requested = count, "Batch finished");
        delivered
    }

    async fn deliver(&mut self, document: &Document, filename: Option<&str>) -> bool {
        let (destination, ok) = match &self.publisher {
            Some(publisher) => (publisher.endpoint().to_string(), publisher.publish(document).await),
            None => match self.sink.save(document, filename) {
                Ok(path) => (path.display().to_string(), true),
                Err(e) => {
                    warn!(title = %document.title, error = %e, "Failed to save post");
                    (self.sink.output_dir().display().to_string(), false)
                }
            },
        };

        let status = match (&self.publisher, ok) {
            (_, false) => "failed",
            (Some(_), true) => "published",
            (None, true) => "saved",
        };
        self.record(document, &destination, status);

        ok
    }

    fn destination(&self) -> String {
        match &self.publisher {
            Some(publisher) => publisher.endpoint().to_string(),
            None => self.sink.output_dir().display().to_string(),
        }
    }

    // Ledger failures never fail the post itself.
    fn record(&self, document: &Document, destination: &str, status: &str) {
        let Some(conn) = &self.ledger else {
            return;
        };

        let post = PostRecord {
            id: format!(
                "{}_{}",
                document.meta.theme,
                document.meta.generated_at.format(&format!("{}%.3f", FILE_TIMESTAMP_FORMAT))
            ),
            theme: document.meta.theme.clone(),
            title: document.title.clone(),
            category: document.meta.category.clone(),
            destination: destination.to_string(),
            status: status.to_string(),
            generated_at: document.meta.generated_at.to_rfc3339(),
        };

        if let Err(e) = db::insert(conn, &post) {
            warn!(id = %post.id, error = %e, "Failed to record post in ledger");
        }
    }
}

#[async_trait]
impl SlotHandler for BlogGenerator {
    async fn fire(&mut self, bucket: Bucket) -> bool {
        self.refresh_catalog().await;
        self.generate_for_slot(bucket).await
    }
}

fn open_ledger(path: &str) -> Option<Connection> {
    match db::open(path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            warn!(path, error = %e, "Post ledger unavailable, continuing without it");
            None
        }
    }
}
