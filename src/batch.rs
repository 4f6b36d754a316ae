use crate::auth::{self, CodeProvider};
use crate::config::Config;
use crate::jira;
use crate::keys::{KeyStore, LoadedKeys};
use crate::output;
use crate::session::{ESCAPE, InteractiveSession, SessionLauncher};
use crate::touch;
use anyhow::{Context, Result};
use std::io::Write;
use std::time::{Duration, Instant};

/// Characters of an error message shown on a key's status line.
const ERROR_PREVIEW_CHARS: usize = 50;

/// Tally of one run over the keys file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub failed_keys: Vec<String>,
    /// Time spent touching issues, login excluded.
    pub elapsed: Duration,
}

/// Touches every pending key in one browser session and writes the failures back.
///
/// Returns `Ok(None)` when there was nothing to do; no session is opened then.
/// On a fatal error the session is still closed and the keys file left as it was.
pub async fn run_batch<L>(
    config: &Config,
    store: &dyn KeyStore,
    launcher: &L,
    codes: &mut dyn CodeProvider,
    stdout_additional: &mut Option<&mut dyn Write>,
) -> Result<Option<RunReport>>
where
    L: SessionLauncher,
{
    let keys = match store.load()? {
        LoadedKeys::Missing => {
            output::println(
                &format!("❌ File '{}' not found!", store.location()),
                stdout_additional,
            )?;
            Vec::new()
        }
        LoadedKeys::Keys(keys) => keys,
    };

    if keys.is_empty() {
        output::println(
            &format!(
                "❌ No keys to process! Make sure '{}' exists and has keys.",
                store.location()
            ),
            stdout_additional,
        )?;
        return Ok(None);
    }

    output::println(
        &format!("📋 Loaded {} keys from {}", keys.len(), store.location()),
        stdout_additional,
    )?;

    output::println("🚀 Opening browser...", stdout_additional)?;
    let mut session = launcher.launch().await.context("Failed to launch browser")?;

    let outcome = drive(
        &mut session,
        config,
        store,
        &keys,
        codes,
        stdout_additional,
    )
    .await;

    if let Err(e) = &outcome {
        output::println(&format!("\n❌ Fatal error: {e:#}"), stdout_additional)?;
    }

    output::println("\n🔒 Closing browser...", stdout_additional)?;
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser: {e:#}");
    }

    outcome.map(Some)
}

async fn drive<S>(
    session: &mut S,
    config: &Config,
    store: &dyn KeyStore,
    keys: &[String],
    codes: &mut dyn CodeProvider,
    stdout_additional: &mut Option<&mut dyn Write>,
) -> Result<RunReport>
where
    S: InteractiveSession + ?Sized,
{
    output::println("\n📋 Logging in to Jira...", stdout_additional)?;
    let landing_url = jira::issue_url(&config.base_url, &keys[0]);
    auth::authenticate(session, config, &landing_url, codes, stdout_additional).await?;

    output::println(
        &format!(
            "\n✅ Logged in! Starting to process {} issues...\n",
            keys.len()
        ),
        stdout_additional,
    )?;

    let report = touch_all(session, config, keys, stdout_additional).await?;

    print_summary(&report, stdout_additional)?;

    if report.failed_keys.is_empty() {
        store.save(&[])?;
        output::println(
            &format!(
                "\n💾 All keys processed! {} is now empty.",
                store.location()
            ),
            stdout_additional,
        )?;
    } else {
        store.save(&report.failed_keys)?;
        output::println(
            &format!(
                "\n💾 Failed keys saved to {} (re-run to retry)",
                store.location()
            ),
            stdout_additional,
        )?;
    }
    output::println(&"=".repeat(50), stdout_additional)?;

    output::println(
        &format!(
            "\n💡 Browser will close in {} seconds...",
            config.timing.close_delay.as_secs()
        ),
        stdout_additional,
    )?;
    tokio::time::sleep(config.timing.close_delay).await;

    Ok(report)
}

/// Touches `keys` in order. A failing key is recorded and the loop moves on.
pub async fn touch_all<S>(
    session: &mut S,
    config: &Config,
    keys: &[String],
    stdout_additional: &mut Option<&mut dyn Write>,
) -> Result<RunReport>
where
    S: InteractiveSession + ?Sized,
{
    let total = keys.len();
    let mut successful = 0;
    let mut failed_keys = Vec::new();
    let start = Instant::now();

    for (i, key) in keys.iter().enumerate() {
        output::print(
            &format!("[{}/{}] {}... ", i + 1, total, key),
            stdout_additional,
        )?;

        match touch::touch_issue(session, config, key).await {
            Ok(()) => {
                output::println("✓", stdout_additional)?;
                successful += 1;
            }
            Err(e) => {
                let message = e.to_string();
                output::println(
                    &format!(
                        "✗ ({})",
                        output::truncate_chars(&message, ERROR_PREVIEW_CHARS)
                    ),
                    stdout_additional,
                )?;
                tracing::debug!(%key, error = %message, "touch failed");
                failed_keys.push(key.clone());
            }
        }

        // Whatever happened, leave no menu or dialog open for the next key.
        if let Err(e) = session.press_key(ESCAPE).await {
            tracing::debug!(%key, "dismissal failed: {e:#}");
        }
    }

    Ok(RunReport {
        total,
        successful,
        failed: failed_keys.len(),
        failed_keys,
        elapsed: start.elapsed(),
    })
}

fn print_summary(report: &RunReport, stdout_additional: &mut Option<&mut dyn Write>) -> Result<()> {
    output::println(&format!("\n{}", "=".repeat(50)), stdout_additional)?;
    output::println("✅ DONE!", stdout_additional)?;
    output::println(
        &format!(
            "   Total time: {}",
            output::format_duration(report.elapsed.as_secs())
        ),
        stdout_additional,
    )?;
    output::println(
        &format!("   Successful: {}/{}", report.successful, report.total),
        stdout_additional,
    )?;
    if report.failed > 0 {
        output::println(
            &format!("   Failed: {}/{}", report.failed, report.total),
            stdout_additional,
        )?;
        output::println("\n❌ FAILED KEYS:", stdout_additional)?;
        for key in &report.failed_keys {
            output::println(&format!("   - {key}"), stdout_additional)?;
        }
    }
    Ok(())
}
