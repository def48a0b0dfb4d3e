//! Archive transport
//!
//! The resolver treats "fetch URL into file" as an injected capability so the
//! transport can be swapped in tests and alternative distribution channels.
//! The default implementation handles `http(s)://` URLs via reqwest and
//! treats anything else as a local filesystem path (with an optional
//! `file://` prefix), which is how file-based repositories are configured.
//!
//! Every failure is an error; the resolver interprets it as a miss for that
//! candidate URL and moves on to the next one.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Transport capability used by the resolver to obtain plugin archives
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the bytes at a rendered resolver URL into the destination file
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// The production transport: HTTP(S) via reqwest, local paths via copy
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    /// Create the default transport
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("godel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;
        if !response.status().is_success() {
            bail!("{} returned HTTP {}", url, response.status());
        }

        let mut file = File::create(dest)
            .with_context(|| format!("failed to create file {}", dest.display()))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("failed to read response from {}", url))?;
            file.write_all(&chunk)
                .with_context(|| format!("failed to write to {}", dest.display()))?;
        }
        debug!("fetched {} to {}", url, dest.display());
        Ok(())
    }
}

#[async_trait]
impl Fetcher for DefaultFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url, dest).await
        } else {
            copy_local(url.strip_prefix("file://").unwrap_or(url), dest)
        }
    }
}

fn copy_local(source: &str, dest: &Path) -> Result<()> {
    let source = Path::new(source);
    if !source.is_file() {
        return Err(anyhow!("{} does not exist", source.display()));
    }
    std::fs::copy(source, dest).with_context(|| {
        format!(
            "failed to copy {} to {}",
            source.display(),
            dest.display()
        )
    })?;
    debug!("copied {} to {}", source.display(), dest.display());
    Ok(())
}
