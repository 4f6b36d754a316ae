use async_trait::async_trait;
use jira_touch::jira;
use jira_touch::session::{ESCAPE, InteractiveSession, SessionLauncher, Target};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the scripted tracker does, plus what it saw.
#[derive(Debug, Default)]
pub struct Script {
    pub broken_issues: HashSet<String>,
    pub stuck_menus: HashSet<String>,
    /// Worklog dialog parts that never render, per issue.
    pub hidden_fields: HashSet<(String, Target)>,
    pub no_code_prompt: bool,
    pub current_issue: Option<String>,
    pub menu_open: bool,
    pub launches: u32,
    pub closed: bool,
    pub worklogs: Vec<String>,
    pub trigger_clicks: u32,
}

pub struct ScriptedLauncher(pub Arc<Mutex<Script>>);

pub struct ScriptedSession(Arc<Mutex<Script>>);

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    async fn launch(&self) -> anyhow::Result<ScriptedSession> {
        self.0.lock().unwrap().launches += 1;
        Ok(ScriptedSession(Arc::clone(&self.0)))
    }
}

#[async_trait]
impl InteractiveSession for ScriptedSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> anyhow::Result<()> {
        let mut script = self.0.lock().unwrap();
        let issue = url.rsplit('/').next().unwrap_or_default().to_string();
        script.menu_open = false;
        if script.broken_issues.contains(&issue) {
            anyhow::bail!("Issue {issue} does not exist or you do not have permission to see it");
        }
        script.current_issue = Some(issue);
        Ok(())
    }

    async fn is_visible(&mut self, target: &Target) -> anyhow::Result<bool> {
        let script = self.0.lock().unwrap();
        if *target == jira::log_work_item() {
            return Ok(script.menu_open);
        }
        if *target == jira::verification_code_field() {
            return Ok(!script.no_code_prompt);
        }
        let issue = script.current_issue.clone().unwrap_or_default();
        Ok(!script.hidden_fields.contains(&(issue, target.clone())))
    }

    async fn click(&mut self, target: &Target) -> anyhow::Result<()> {
        let mut script = self.0.lock().unwrap();
        let issue = script.current_issue.clone().unwrap_or_default();
        if *target == jira::issue_menu_trigger() {
            script.trigger_clicks += 1;
            script.menu_open = !script.stuck_menus.contains(&issue);
        } else if *target == jira::save_worklog_button() {
            script.worklogs.push(issue);
        }
        Ok(())
    }

    async fn fill(&mut self, _target: &Target, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn press_key(&mut self, key: &str) -> anyhow::Result<()> {
        if key == ESCAPE {
            self.0.lock().unwrap().menu_open = false;
        }
        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.0.lock().unwrap().closed = true;
        Ok(())
    }
}
