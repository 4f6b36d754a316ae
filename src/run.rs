use crate::auth;
use crate::batch;
use crate::browser;
use crate::cli;
use crate::config;
use crate::keys::{self, KeyStore};
use crate::output;
use std::path::PathBuf;

pub async fn run(
    args: Vec<String>,
    mut stdout_additional: Option<&mut dyn std::io::Write>,
) -> anyhow::Result<()> {
    match cli::parser::parse_args(&args) {
        cli::parser::Command::Touch { keys_file } => {
            let config = match config::Config::from_env() {
                Ok(config) => config,
                Err(missing) => {
                    report_missing_config(&missing, &mut stdout_additional)?;
                    return Ok(());
                }
            };
            let config = match keys_file {
                Some(path) => config.with_keys_file(path),
                None => config,
            };

            let store = keys::FileKeyStore::new(&config.keys_file);
            let launcher = browser::ChromiumLauncher::new(config.timing.action_delay);
            let mut codes = auth::StdinCodeProvider;
            batch::run_batch(
                &config,
                &store,
                &launcher,
                &mut codes,
                &mut stdout_additional,
            )
            .await?;
        }
        cli::parser::Command::Pending { keys_file } => {
            let path = match keys_file {
                Some(path) => PathBuf::from(path),
                None => {
                    config::load_dotenv();
                    config::keys_file_from_lookup(|key| std::env::var(key).ok())
                }
            };
            let store = keys::FileKeyStore::new(path);
            list_pending(&store, &mut stdout_additional)?;
        }
        cli::parser::Command::Help => {
            output::println(&cli::parser::usage(), &mut stdout_additional)?;
        }
        cli::parser::Command::Unknown(what) => {
            output::println(
                &format!("Invalid command or arguments: {what}. Use --help for usage."),
                &mut stdout_additional,
            )?;
        }
    }
    Ok(())
}

fn report_missing_config(
    missing: &config::MissingConfig,
    stdout_additional: &mut Option<&mut dyn std::io::Write>,
) -> anyhow::Result<()> {
    output::println(
        "❌ Missing required environment variables:",
        stdout_additional,
    )?;
    for key in &missing.0 {
        output::println(&format!("   - {key}"), stdout_additional)?;
    }
    output::println(
        "\n💡 Create a .env file with your configuration, or export the variables above.",
        stdout_additional,
    )?;
    Ok(())
}

/// Prints the pending keys and their count.
pub fn list_pending(
    store: &dyn KeyStore,
    stdout_additional: &mut Option<&mut dyn std::io::Write>,
) -> anyhow::Result<()> {
    match store.load()? {
        keys::LoadedKeys::Missing => {
            output::println(
                &format!("❌ File '{}' not found!", store.location()),
                stdout_additional,
            )?;
        }
        keys::LoadedKeys::Keys(pending) if pending.is_empty() => {
            output::println(
                &format!("✓ Nothing pending in {}", store.location()),
                stdout_additional,
            )?;
        }
        keys::LoadedKeys::Keys(pending) => {
            output::println(
                &format!("📋 {} keys pending in {}", pending.len(), store.location()),
                stdout_additional,
            )?;
            for key in &pending {
                output::println(&format!("   - {key}"), stdout_additional)?;
            }
        }
    }
    Ok(())
}
