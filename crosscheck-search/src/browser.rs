//! Lazily started, stealth-configured headless Chromium session.
//!
//! One [`BrowserSession`] belongs to one orchestrator and is shared (behind
//! `Arc`) by the Google adapter and the page fetcher. Access is serialised
//! through an async mutex, so at most one page is driven at a time. A launch
//! failure disables the session until it is dropped; callers then skip their
//! browser paths.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::BrowserSettings;
use crate::error::SearchError;

/// Poll interval while waiting for a selector to appear.
const SELECTOR_POLL: Duration = Duration::from_millis(250);

enum SessionState {
    Idle,
    Running {
        browser: Browser,
        handler: JoinHandle<()>,
    },
    Disabled(String),
}

/// What to wait for after navigation.
#[derive(Debug, Clone, Copy)]
pub struct WaitFor<'a> {
    /// CSS selector (a selector list is fine) that signals a rendered page.
    pub selector: &'a str,
    /// How long to wait before giving up.
    pub timeout: Duration,
}

/// A cookie to place in the browser before navigating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCookie {
    pub name: String,
    pub value: String,
    /// URL the cookie is scoped to.
    pub url: String,
    /// Cookie domain, e.g. `.google.com` to cover every subdomain.
    pub domain: Option<String>,
}

impl PageCookie {
    fn to_param(&self) -> Result<CookieParam, SearchError> {
        let mut builder = CookieParam::builder()
            .name(self.name.as_str())
            .value(self.value.as_str())
            .url(self.url.as_str())
            .path("/");
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.as_str());
        }
        builder
            .build()
            .map_err(|e| SearchError::Browser(format!("cookie {}: {e}", self.name)))
    }
}

/// Shared headless-browser handle.
pub struct BrowserSession {
    settings: BrowserSettings,
    user_agent: String,
    navigation_timeout: Duration,
    proxy: Option<String>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("enabled", &self.settings.enabled)
            .field("navigation_timeout", &self.navigation_timeout)
            .finish_non_exhaustive()
    }
}

impl BrowserSession {
    /// A session that launches Chromium on first use.
    pub fn new(settings: BrowserSettings, user_agent: String, navigation_timeout: Duration) -> Self {
        let state = if settings.enabled {
            SessionState::Idle
        } else {
            SessionState::Disabled("browser disabled by configuration".into())
        };
        Self {
            settings,
            user_agent,
            navigation_timeout,
            proxy: None,
            state: Mutex::new(state),
        }
    }

    /// Route the browser's traffic through `proxy`.
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    /// A session that never launches.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            settings: BrowserSettings {
                enabled: false,
                ..BrowserSettings::default()
            },
            user_agent: String::new(),
            navigation_timeout: Duration::ZERO,
            proxy: None,
            state: Mutex::new(SessionState::Disabled(reason.into())),
        }
    }

    /// False once the session is disabled by configuration or a failed launch.
    pub async fn is_available(&self) -> bool {
        !matches!(*self.state.lock().await, SessionState::Disabled(_))
    }

    /// Navigate to `url`, optionally wait for a selector, let scripts settle
    /// for `settle`, and return the rendered HTML.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Browser`] if the session is disabled or Chromium
    ///   cannot be launched or driven
    /// - [`SearchError::Timeout`] if navigation or the selector wait expires
    pub async fn render(
        &self,
        url: &str,
        wait_for: Option<WaitFor<'_>>,
        settle: Duration,
    ) -> Result<String, SearchError> {
        self.render_with_cookies(url, &[], wait_for, settle).await
    }

    /// [`BrowserSession::render`], with `cookies` set on the fresh page
    /// before it navigates.
    ///
    /// # Errors
    ///
    /// As for `render`, plus [`SearchError::Browser`] if a cookie is refused.
    pub async fn render_with_cookies(
        &self,
        url: &str,
        cookies: &[PageCookie],
        wait_for: Option<WaitFor<'_>>,
        settle: Duration,
    ) -> Result<String, SearchError> {
        let mut state = self.state.lock().await;

        if matches!(*state, SessionState::Idle) {
            match self.launch().await {
                Ok((browser, handler)) => *state = SessionState::Running { browser, handler },
                Err(e) => {
                    tracing::warn!(error = %e, "headless browser unavailable, disabling");
                    *state = SessionState::Disabled(e.to_string());
                    return Err(e);
                }
            }
        }

        let browser = match &*state {
            SessionState::Running { browser, .. } => browser,
            SessionState::Disabled(reason) => return Err(SearchError::Browser(reason.clone())),
            SessionState::Idle => {
                return Err(SearchError::Browser("browser not started".into()));
            }
        };

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SearchError::Browser(format!("new page failed: {e}")))?;

        let outcome = self.drive(&page, url, cookies, wait_for, settle).await;

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "page close failed");
        }
        outcome
    }

    async fn drive(
        &self,
        page: &Page,
        url: &str,
        cookies: &[PageCookie],
        wait_for: Option<WaitFor<'_>>,
        settle: Duration,
    ) -> Result<String, SearchError> {
        if let Err(e) = page.enable_stealth_mode_with_agent(&self.user_agent).await {
            tracing::debug!(error = %e, "stealth mode not applied");
        }

        for cookie in cookies {
            page.set_cookie(cookie.to_param()?)
                .await
                .map_err(|e| SearchError::Browser(format!("setting cookie {}: {e}", cookie.name)))?;
        }

        match tokio::time::timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(SearchError::Browser(format!("navigation failed: {e}"))),
            Err(_) => return Err(SearchError::Timeout(format!("browser navigation to {url}"))),
        }

        if let Some(wait) = wait_for {
            let appeared = tokio::time::timeout(wait.timeout, async {
                while page.find_element(wait.selector).await.is_err() {
                    tokio::time::sleep(SELECTOR_POLL).await;
                }
            })
            .await;
            if appeared.is_err() {
                return Err(SearchError::Timeout(format!(
                    "waiting for `{}` on {url}",
                    wait.selector
                )));
            }
        }

        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        page.content()
            .await
            .map_err(|e| SearchError::Browser(format!("reading page content failed: {e}")))
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), SearchError> {
        let (width, height) = self.settings.window_size;
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(width, height);
        for arg in self.launch_args() {
            builder = builder.arg(arg);
        }
        if let Some(path) = &self.settings.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| SearchError::Browser(format!("browser config: {e}")))?;

        let timeout = Duration::from_secs(self.settings.launch_timeout_seconds);
        let (browser, mut handler) = tokio::time::timeout(timeout, Browser::launch(config))
            .await
            .map_err(|_| SearchError::Browser("browser launch timed out".into()))?
            .map_err(|e| SearchError::Browser(format!("browser launch failed: {e}")))?;

        // The CDP connection only makes progress while the handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "CDP handler event error");
                }
            }
            tracing::debug!("CDP handler finished");
        });

        tracing::debug!("headless browser launched");
        Ok((browser, handler))
    }

    /// Extra Chromium flags for this session.
    fn launch_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--disable-blink-features=AutomationControlled",
            "--disable-infobars",
            "--lang=en-US",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect();
        if let Some(proxy) = &self.proxy {
            args.push(format!("--proxy-server={proxy}"));
        }
        args
    }

    /// Close the browser if it is running. A later `render` relaunches it.
    /// A disabled session stays disabled.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if !matches!(*state, SessionState::Running { .. }) {
            return;
        }
        if let SessionState::Running {
            mut browser,
            handler,
        } = std::mem::replace(&mut *state, SessionState::Idle)
        {
            if let Err(e) = browser.close().await {
                tracing::debug!(error = %e, "browser close failed");
            }
            handler.abort();
            tracing::debug!("headless browser shut down");
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let SessionState::Running { handler, .. } = self.state.get_mut() {
            handler.abort();
        }
    }
}
