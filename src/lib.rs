pub mod auth;
pub mod batch;
pub mod browser;
pub mod cli {
    pub mod parser;
}
pub mod config;
pub mod jira;
pub mod keys;
pub mod output;
pub mod run;
pub mod session;
pub mod touch;
