//! Headless browser page fetch
//!
//! Every call launches its own Chromium with a throwaway profile directory,
//! renders the page, extracts paragraph text in the DOM and shuts the
//! browser down again before returning, whatever the outcome.

use super::extract::PARAGRAPH_SCRIPT;
use super::normalize::Envelope;
use super::ContentFetcher;
use crate::config::{FetchSettings, FetchStrategy};
use crate::error::{Error, Result};
use crate::network::generate_user_agent;
use crate::results::ContentExcerpt;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long a browser gets to close and exit before it is killed
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Renders pages in an isolated browser before extracting text
pub struct RenderedFetcher {
    timeout: Duration,
    envelope: Envelope,
    chrome_executable: Option<PathBuf>,
}

impl RenderedFetcher {
    pub fn new(settings: &FetchSettings) -> Self {
        Self {
            timeout: Duration::from_secs_f64(settings.render_timeout),
            envelope: Envelope::from_settings(settings),
            chrome_executable: settings.chrome_executable.as_ref().map(PathBuf::from),
        }
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .request_timeout(self.timeout)
            .arg(format!("--user-agent={}", generate_user_agent()))
            .arg("--disable-gpu")
            .arg("--no-first-run");

        if let Some(ref path) = self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(Error::Fetch)
    }

    async fn render(&self, url: &str) -> Result<String> {
        let profile = ProfileDir::create();
        let config = self.browser_config(profile.path())?;

        let session = BrowserSession::launch(config, profile).await?;
        let rendered = tokio::time::timeout(self.timeout, session.paragraph_text(url)).await;
        session.shutdown().await;

        match rendered {
            Ok(result) => result,
            Err(_) => Err(Error::Fetch(format!(
                "navigation timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl ContentFetcher for RenderedFetcher {
    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Rendered
    }

    async fn fetch(&self, url: &str) -> ContentExcerpt {
        match self.render(url).await {
            Ok(text) => {
                debug!("Rendered {} chars from {}", text.chars().count(), url);
                self.envelope.normalize(&text)
            }
            Err(e) => {
                warn!("Failed to render {}: {}", url, e);
                ContentExcerpt::FetchError
            }
        }
    }
}

/// Throwaway browser profile directory, deleted on drop
struct ProfileDir(PathBuf);

impl ProfileDir {
    fn create() -> Self {
        Self(std::env::temp_dir().join(format!(
            "searchsynth-{:016x}",
            rand::random::<u64>()
        )))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.0) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => debug!("Could not remove {}: {}", self.0.display(), e),
        }
    }
}

/// One running browser process and the task driving its CDP connection
///
/// Field order matters: the profile directory is removed only after the
/// browser has been dropped.
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile: ProfileDir,
}

impl BrowserSession {
    async fn launch(config: BrowserConfig, profile: ProfileDir) -> Result<Self> {
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Fetch(format!("browser launch failed: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            _profile: profile,
        })
    }

    async fn paragraph_text(&self, url: &str) -> Result<String> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| Error::Fetch(format!("navigation failed: {}", e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| Error::Fetch(format!("page did not settle: {}", e)))?;

        page.evaluate(PARAGRAPH_SCRIPT)
            .await
            .map_err(|e| Error::Fetch(format!("extraction script failed: {}", e)))?
            .into_value::<String>()
            .map_err(|e| Error::Fetch(format!("extraction returned non-text: {}", e)))
    }

    /// Close the browser and wait for the process to exit, killing it if
    /// either step fails or takes longer than [`SHUTDOWN_GRACE`]
    async fn shutdown(mut self) {
        let exit = async {
            self.browser
                .close()
                .await
                .map_err(|e| Error::Fetch(format!("browser close failed: {}", e)))?;
            self.browser.wait().await?;
            Ok::<(), Error>(())
        };

        if let Err(e) = exit_within(SHUTDOWN_GRACE, exit).await {
            debug!("{}, killing browser process", e);
            if let Some(Err(e)) = self.browser.kill().await {
                warn!("Could not kill browser process: {}", e);
            }
        }
        self.handler.abort();
    }
}

/// Await `exit`, turning an overrun of `grace` into an error
async fn exit_within<F>(grace: Duration, exit: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match tokio::time::timeout(grace, exit).await {
        Ok(result) => result,
        Err(_) => Err(Error::Fetch(format!(
            "browser did not exit within {:?}",
            grace
        ))),
    }
}

impl Drop for BrowserSession {
    // Reached without shutdown() only if the fetch future itself is dropped;
    // Browser's own Drop kills the child process.
    fn drop(&mut self) {
        self.handler.abort();
    }
}
