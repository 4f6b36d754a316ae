use cucumber::World;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, World)]
pub struct TouchWorld {
    pub workdir: Option<tempfile::TempDir>,
    pub script: Arc<Mutex<scripted::Script>>,
    pub captured_output: Vec<u8>,
    pub run_result: Option<Result<Option<jira_touch::batch::RunReport>, anyhow::Error>>,
    pub config_result: Option<Result<jira_touch::config::Config, jira_touch::config::MissingConfig>>,
    pub loaded_keys: Option<jira_touch::keys::LoadedKeys>,
}

impl TouchWorld {
    pub fn keys_path(&mut self) -> std::path::PathBuf {
        self.workdir
            .get_or_insert_with(|| tempfile::tempdir().expect("Failed to create temp dir"))
            .path()
            .join("keys.txt")
    }
}

#[tokio::main]
async fn main() {
    TouchWorld::run("features").await;
}

mod scripted;
