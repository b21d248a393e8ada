//! Chromium-backed sessions via chromiumoxide.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use marketlens_core::AppConfig;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{ClickTarget, PageSession, SessionFactory};
use crate::error::ScraperError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chrome's wording when the tab or its debugging session is gone.
const DEAD_TARGET_MESSAGES: &[&str] = &[
    "target closed",
    "session closed",
    "no target with given id",
    "session with given id not found",
    "inspected target navigated or closed",
];

/// Hides the most common automation fingerprints before any page script runs.
const STEALTH_SCRIPT: &str = r"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'languages', { get: () => ['id-ID', 'id', 'en-US', 'en'] });
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
    window.chrome = { runtime: {} };
";

/// Launches one headless Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumSessionFactory {
    chrome_path: Option<PathBuf>,
    user_agent: String,
    navigation_timeout: Duration,
}

impl ChromiumSessionFactory {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            chrome_path: config.chrome_path.clone(),
            user_agent: config.user_agent.clone(),
            navigation_timeout: Duration::from_secs(config.page_timeout_secs),
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .viewport(Some(Viewport {
                width: 1920,
                height: 1080,
                device_scale_factor: Some(1.0),
                ..Default::default()
            }))
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--log-level=3")
            .arg(format!("--user-agent={}", self.user_agent));

        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(ScraperError::Launch)
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self) -> Result<Box<dyn PageSession>, ScraperError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::Launch(e.to_string()))?;

        let handler = HandlerTask(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler event error");
                }
            }
        }));

        let page = browser.new_page("about:blank").await?;
        if let Err(e) = page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
            .await
        {
            tracing::warn!(error = %e, "failed to install stealth script");
        }

        tracing::debug!("browser session opened");
        Ok(Box::new(ChromiumSession {
            browser,
            page,
            _handler: handler,
            navigation_timeout: self.navigation_timeout,
        }))
    }
}

/// Aborts the CDP event loop when the session goes away, including when a
/// run is cancelled mid-flight.
struct HandlerTask(JoinHandle<()>);

impl Drop for HandlerTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    _handler: HandlerTask,
    navigation_timeout: Duration,
}

impl ChromiumSession {
    async fn eval<T: DeserializeOwned>(&self, context: &str, script: String) -> Result<T, ScraperError> {
        let result = self.page.evaluate(script).await.map_err(classify)?;
        result.into_value().map_err(|e| ScraperError::Script {
            context: context.to_string(),
            reason: format!("{e:?}"),
        })
    }
}

fn is_dead_target(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    DEAD_TARGET_MESSAGES.iter().any(|m| message.contains(m))
}

/// Maps a protocol error to [`ScraperError::Session`] when the tab, the
/// browser or the CDP handler is gone, otherwise to [`ScraperError::Browser`].
fn classify(err: CdpError) -> ScraperError {
    match err {
        CdpError::NoResponse | CdpError::ChannelSendError(_) => ScraperError::Session(err.to_string()),
        other if is_dead_target(&other.to_string()) => ScraperError::Session(other.to_string()),
        other => ScraperError::Browser(other),
    }
}

/// JSON-encodes `raw` so it can be spliced into a script as a string literal.
fn js_string(raw: &str) -> String {
    serde_json::Value::from(raw).to_string()
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        match tokio::time::timeout(self.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => {
                tracing::warn!(
                    url,
                    timeout_secs = self.navigation_timeout.as_secs(),
                    "navigation did not finish loading, continuing"
                );
                Ok(())
            }
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool, ScraperError> {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval::<bool>("waiting for selector", script.clone()).await? {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn html(&self) -> Result<String, ScraperError> {
        self.page.content().await.map_err(classify)
    }

    async fn scroll_to_bottom(&self) -> Result<(), ScraperError> {
        self.eval::<bool>(
            "scrolling",
            "window.scrollTo(0, document.body.scrollHeight); true".to_string(),
        )
        .await?;
        Ok(())
    }

    async fn click(&self, target: &ClickTarget) -> Result<bool, ScraperError> {
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({})[{}]; \
             if (!el) return false; \
             el.scrollIntoView({{ block: 'center' }}); el.click(); return true; }})()",
            js_string(&target.selector),
            target.index
        );
        self.eval("clicking", script).await
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        let ChromiumSession {
            mut browser, page, ..
        } = *self;
        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "page close failed, closing browser anyway");
        }
        browser.close().await?;
        if let Err(e) = browser.wait().await {
            tracing::warn!(error = %e, "browser process did not exit cleanly");
        }
        tracing::debug!("browser session closed");
        Ok(())
    }
}
