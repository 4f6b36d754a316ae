//! Chromium-backed [`InteractiveSession`] over the DevTools protocol.
//!
//! Targets are located by an in-page script that tags the matching element
//! with a marker attribute; the tagged element is then driven through a
//! regular chromiumoxide element handle so clicks and typing are real input
//! events rather than synthetic DOM calls.

use crate::session::{InteractiveSession, SessionLauncher, Target};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use futures::StreamExt;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const MARKER_ATTR: &str = "data-jira-touch-target";
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Finds the element for a target descriptor, moves the marker onto it and
/// reports `visible`, `hidden` or `missing`.
const LOCATE_FN: &str = r#"function (target, marker) {
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
  const visible = (el) => {
    if (!el || !el.isConnected) return false;
    const style = window.getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  };
  const all = (selector) => Array.from(document.querySelectorAll(selector));
  let candidates = [];
  if (target.kind === 'test_id') {
    candidates = all('[data-testid]').filter((el) => el.getAttribute('data-testid') === target.id);
  } else if (target.kind === 'role') {
    const wanted = norm(target.name);
    candidates = all('[role]').filter((el) =>
      el.getAttribute('role') === target.role &&
      norm(el.getAttribute('aria-label') || el.textContent).includes(wanted));
  } else if (target.kind === 'label') {
    const wanted = norm(target.text);
    const labelled = all('label')
      .filter((l) => norm(l.textContent).includes(wanted))
      .map((l) => l.control)
      .filter(Boolean);
    const aria = all('[aria-label]').filter((el) => norm(el.getAttribute('aria-label')).includes(wanted));
    candidates = labelled.concat(aria);
  }
  all('[' + marker + ']').forEach((el) => el.removeAttribute(marker));
  const el = candidates.find(visible) || candidates[0];
  if (!el) return 'missing';
  el.setAttribute(marker, '');
  return visible(el) ? 'visible' : 'hidden';
}"#;

/// Focuses the marked input and selects its content so typing replaces it.
const SELECT_MARKED_FN: &str = r#"function (marker) {
  const el = document.querySelector('[' + marker + ']');
  if (!el) return false;
  el.focus();
  if (typeof el.select === 'function') el.select();
  return true;
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Visible,
    Hidden,
    Missing,
}

fn target_descriptor(target: &Target) -> serde_json::Value {
    match target {
        Target::TestId(id) => json!({ "kind": "test_id", "id": id }),
        Target::Role { role, name } => json!({ "kind": "role", "role": role, "name": name }),
        Target::Label(text) => json!({ "kind": "label", "text": text }),
    }
}

fn locate_expression(target: &Target) -> String {
    format!(
        "({LOCATE_FN})({}, {})",
        target_descriptor(target),
        json!(MARKER_ATTR)
    )
}

fn virtual_key_code(key: &str) -> Option<i64> {
    match key {
        "Escape" => Some(27),
        "Enter" => Some(13),
        "Tab" => Some(9),
        _ => None,
    }
}

/// Launches a visible Chromium window for the operator to watch.
pub struct ChromiumLauncher {
    action_delay: Duration,
}

impl ChromiumLauncher {
    /// `action_delay` is slept after every action, slowing the run to a watchable pace.
    pub fn new(action_delay: Duration) -> Self {
        Self { action_delay }
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession> {
        info!("launching Chromium");
        let config = BrowserConfig::builder()
            .with_head()
            .window_size(1280, 900)
            .build()
            .map_err(|e| anyhow!("Failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to start Chromium")?;

        // The CDP connection only makes progress while its handler is polled.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {e}");
                }
            }
            debug!("CDP handler finished");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(anyhow!(e).context("Failed to open a browser tab"));
            }
        };

        Ok(ChromiumSession {
            browser,
            page,
            handler_task,
            action_delay: self.action_delay,
        })
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    action_delay: Duration,
}

impl ChromiumSession {
    async fn locate(&self, target: &Target) -> Result<Presence> {
        let state: String = self
            .page
            .evaluate(locate_expression(target))
            .await
            .with_context(|| format!("Failed to look up {target}"))?
            .into_value()
            .with_context(|| format!("Unexpected lookup result for {target}"))?;
        match state.as_str() {
            "visible" => Ok(Presence::Visible),
            "hidden" => Ok(Presence::Hidden),
            "missing" => Ok(Presence::Missing),
            other => Err(anyhow!("Unexpected lookup result for {target}: {other}")),
        }
    }

    /// Marks the target and returns a handle to it. Fails unless it is visible.
    async fn element(&self, target: &Target) -> Result<chromiumoxide::Element> {
        match self.locate(target).await? {
            Presence::Visible => {}
            Presence::Hidden => return Err(anyhow!("{target} is not visible")),
            Presence::Missing => return Err(anyhow!("{target} not found")),
        }
        self.page
            .find_element(format!("[{MARKER_ATTR}]"))
            .await
            .with_context(|| format!("{target} detached before it could be used"))
    }

    async fn document_ready(&self) -> Result<bool> {
        let state: String = self
            .page
            .evaluate("document.readyState")
            .await?
            .into_value()?;
        Ok(state == "interactive" || state == "complete")
    }

    async fn settle(&self) {
        if !self.action_delay.is_zero() {
            tokio::time::sleep(self.action_delay).await;
        }
    }
}

#[async_trait]
impl InteractiveSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        debug!(%url, "navigating");
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .with_context(|| format!("Navigation to {url} failed"))?;
        if let Some(error) = &response.result.error_text {
            return Err(anyhow!("Navigation to {url} failed: {error}"));
        }

        let start = Instant::now();
        loop {
            // The document may be mid-swap; treat evaluation errors as "not ready yet".
            if self.document_ready().await.unwrap_or(false) {
                break;
            }
            if start.elapsed() >= timeout {
                return Err(anyhow!(
                    "Timeout {}ms exceeded navigating to {url}",
                    timeout.as_millis()
                ));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
        self.settle().await;
        Ok(())
    }

    async fn is_visible(&mut self, target: &Target) -> Result<bool> {
        Ok(self.locate(target).await? == Presence::Visible)
    }

    async fn click(&mut self, target: &Target) -> Result<()> {
        debug!(%target, "click");
        let element = self.element(target).await?;
        element
            .click()
            .await
            .with_context(|| format!("Click on {target} failed"))?;
        self.settle().await;
        Ok(())
    }

    async fn fill(&mut self, target: &Target, text: &str) -> Result<()> {
        debug!(%target, chars = text.chars().count(), "fill");
        let element = self.element(target).await?;
        let selected: bool = self
            .page
            .evaluate(format!("({SELECT_MARKED_FN})({})", json!(MARKER_ATTR)))
            .await
            .with_context(|| format!("Failed to focus {target}"))?
            .into_value()?;
        if !selected {
            return Err(anyhow!("{target} detached before it could be filled"));
        }
        element
            .type_str(text)
            .await
            .with_context(|| format!("Failed to type into {target}"))?;
        self.settle().await;
        Ok(())
    }

    async fn press_key(&mut self, key: &str) -> Result<()> {
        debug!(%key, "press");
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key(key)
                .code(key);
            if let Some(code) = virtual_key_code(key) {
                builder = builder
                    .windows_virtual_key_code(code)
                    .native_virtual_key_code(code);
            }
            let params = builder
                .build()
                .map_err(|e| anyhow!("Invalid key event for {key}: {e}"))?;
            self.page
                .execute(params)
                .await
                .with_context(|| format!("Failed to press {key}"))?;
        }
        self.settle().await;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let result = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Chromium did not exit cleanly: {e}");
        }
        self.handler_task.abort();
        result.context("Failed to close browser")?;
        info!("Chromium closed");
        Ok(())
    }
}
