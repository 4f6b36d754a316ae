//! Scripted stand-in for a browser session.

use super::{ESCAPE, InteractiveSession, SessionLauncher, Target};
use crate::jira;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    /// Every call, in order, e.g. `click [data-testid="username"]`.
    pub events: Vec<String>,
    /// Targets that never become visible.
    pub hidden: HashSet<Target>,
    /// Trigger clicks that leave the menu closed, per issue key. `u32::MAX` keeps it closed.
    pub menu_misses: HashMap<String, u32>,
    /// Issue keys whose page fails to load.
    pub unreachable: HashSet<String>,
    /// Visibility checks that error before the target can be seen. `u32::MAX` always errors.
    pub failing_lookups: HashMap<Target, u32>,
    /// Number of visibility checks made.
    pub lookups: u32,
    pub fail_launch: bool,
    pub fail_close: bool,
    pub current_key: Option<String>,
    pub menu_open: bool,
    pub launches: u32,
    pub closed: bool,
}

impl FakeState {
    pub fn count(&self, event: &str) -> usize {
        self.events.iter().filter(|e| e.as_str() == event).count()
    }
}

pub(crate) struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    pub fn new(state: FakeState) -> (Self, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(state));
        (
            FakeSession {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl InteractiveSession for FakeSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        let mut state = self.state();
        state.events.push(format!("navigate {url}"));
        state.menu_open = false;
        let key = url.rsplit('/').next().unwrap_or_default().to_string();
        if state.unreachable.contains(&key) {
            return Err(anyhow!("net::ERR_CONNECTION_RESET at {url}"));
        }
        state.current_key = Some(key);
        Ok(())
    }

    async fn is_visible(&mut self, target: &Target) -> Result<bool> {
        let mut state = self.state();
        state.lookups += 1;
        if let Some(failures) = state.failing_lookups.get_mut(target) {
            if *failures > 0 {
                if *failures != u32::MAX {
                    *failures -= 1;
                }
                return Err(anyhow!("Execution context was destroyed"));
            }
        }
        if *target == jira::log_work_item() {
            return Ok(state.menu_open);
        }
        Ok(!state.hidden.contains(target))
    }

    async fn click(&mut self, target: &Target) -> Result<()> {
        let mut state = self.state();
        state.events.push(format!("click {target}"));
        if *target == jira::issue_menu_trigger() {
            let key = state.current_key.clone().unwrap_or_default();
            match state.menu_misses.get_mut(&key) {
                Some(misses) if *misses > 0 => {
                    if *misses != u32::MAX {
                        *misses -= 1;
                    }
                }
                _ => state.menu_open = true,
            }
        } else if *target == jira::log_work_item() {
            if !state.menu_open {
                return Err(anyhow!("{target} is not visible"));
            }
            state.menu_open = false;
        }
        Ok(())
    }

    async fn fill(&mut self, target: &Target, text: &str) -> Result<()> {
        self.state().events.push(format!("fill {target}={text}"));
        Ok(())
    }

    async fn press_key(&mut self, key: &str) -> Result<()> {
        let mut state = self.state();
        state.events.push(format!("press {key}"));
        if key == ESCAPE {
            state.menu_open = false;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.state();
        state.events.push("close".to_string());
        state.closed = true;
        if state.fail_close {
            return Err(anyhow!("browser already gone"));
        }
        Ok(())
    }
}

pub(crate) struct FakeLauncher {
    state: Arc<Mutex<FakeState>>,
}

impl FakeLauncher {
    pub fn new(state: FakeState) -> (Self, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(state));
        (
            FakeLauncher {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self) -> Result<FakeSession> {
        let mut state = self.state.lock().unwrap();
        state.launches += 1;
        if state.fail_launch {
            return Err(anyhow!("Chromium executable not found"));
        }
        Ok(FakeSession {
            state: Arc::clone(&self.state),
        })
    }
}
