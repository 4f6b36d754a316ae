use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::time::{Duration, Instant};

#[cfg(test)]
pub(crate) mod fake;

/// How often [`InteractiveSession::wait_for_visible`] re-checks an element.
pub const VISIBILITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Key that dismisses an open menu or dialog.
pub const ESCAPE: &str = "Escape";

/// A UI element, described the way the page exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Element carrying `data-testid="<id>"`.
    TestId(String),
    /// Element with an ARIA role whose accessible name contains `name`, ignoring case.
    Role { role: String, name: String },
    /// Form control whose label or `aria-label` contains the text, ignoring case.
    Label(String),
}

impl Target {
    pub fn test_id(id: impl Into<String>) -> Self {
        Target::TestId(id.into())
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Target::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Target::Label(text.into())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::TestId(id) => write!(f, "[data-testid=\"{id}\"]"),
            Target::Role { role, name } => write!(f, "role={role}[name=\"{name}\"]"),
            Target::Label(text) => write!(f, "label=\"{text}\""),
        }
    }
}

/// The narrow set of browser operations the login and work-log flows need.
///
/// One session is driven by one task at a time; every call completes before the
/// next one starts.
#[async_trait]
pub trait InteractiveSession: Send {
    /// Loads `url` and returns once the document is interactive.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Whether the target is currently rendered and visible. Absence is `Ok(false)`.
    async fn is_visible(&mut self, target: &Target) -> Result<bool>;

    async fn click(&mut self, target: &Target) -> Result<()>;

    /// Replaces the value of an input.
    async fn fill(&mut self, target: &Target, text: &str) -> Result<()>;

    /// Sends a key press to the focused page, e.g. [`ESCAPE`].
    async fn press_key(&mut self, key: &str) -> Result<()>;

    async fn close(&mut self) -> Result<()>;

    /// Polls [`is_visible`](Self::is_visible) until the target shows up or `timeout` runs out.
    ///
    /// A failed lookup counts as "not visible yet"; the page may be between
    /// documents. The last such error is reported if the wait times out.
    async fn wait_for_visible(&mut self, target: &Target, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let mut last_error: Option<anyhow::Error> = None;
        loop {
            match self.is_visible(target).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(%target, "lookup failed while waiting: {e:#}");
                    last_error = Some(e);
                }
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                let message = format!(
                    "Timeout {}ms exceeded waiting for {} to be visible",
                    timeout.as_millis(),
                    target
                );
                return Err(match last_error {
                    Some(e) => anyhow::anyhow!("{message} (last lookup error: {e:#})"),
                    None => anyhow::anyhow!(message),
                });
            }
            tokio::time::sleep(VISIBILITY_POLL_INTERVAL.min(timeout - elapsed)).await;
        }
    }
}

/// Opens the one session a run works in.
#[async_trait]
pub trait SessionLauncher: Sync {
    type Session: InteractiveSession;

    async fn launch(&self) -> Result<Self::Session>;
}
