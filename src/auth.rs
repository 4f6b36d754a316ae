use crate::config::Config;
use crate::jira;
use crate::output;
use crate::session::InteractiveSession;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Source of the one-time verification code asked for during login.
pub trait CodeProvider {
    /// Blocks until a code is available. Any prompt goes through `stdout_additional` too.
    fn verification_code(
        &mut self,
        stdout_additional: &mut Option<&mut dyn Write>,
    ) -> Result<String>;
}

const CODE_PROMPT: &str = "   Enter your 6-digit verification code: ";

/// Asks the operator on the terminal. Waits as long as it takes.
pub struct StdinCodeProvider;

impl CodeProvider for StdinCodeProvider {
    fn verification_code(
        &mut self,
        stdout_additional: &mut Option<&mut dyn Write>,
    ) -> Result<String> {
        prompt_for_code(&mut io::stdin().lock(), stdout_additional)
    }
}

/// Prints the prompt and reads one trimmed line from `input`.
fn prompt_for_code(
    input: &mut dyn BufRead,
    stdout_additional: &mut Option<&mut dyn Write>,
) -> Result<String> {
    output::print(CODE_PROMPT, stdout_additional)?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read verification code")?;
    if read == 0 {
        return Err(anyhow::anyhow!(
            "Standard input closed before a verification code was entered"
        ));
    }
    Ok(line.trim().to_string())
}

/// A code known up front.
pub struct FixedCode(pub String);

impl CodeProvider for FixedCode {
    fn verification_code(&mut self, _: &mut Option<&mut dyn Write>) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Logs in through the tracker's two-step form and its verification code prompt.
///
/// `landing_url` must require authentication; the session ends up back on it.
/// Any error here is fatal for the run.
pub async fn authenticate<S>(
    session: &mut S,
    config: &Config,
    landing_url: &str,
    codes: &mut dyn CodeProvider,
    stdout_additional: &mut Option<&mut dyn Write>,
) -> Result<()>
where
    S: InteractiveSession + ?Sized,
{
    let timing = &config.timing;

    session
        .navigate(landing_url, timing.navigation_timeout)
        .await
        .context("Failed to reach the login page")?;

    let username = jira::username_field();
    let submit = jira::login_submit();
    session
        .wait_for_visible(&username, timing.element_timeout)
        .await
        .context("Username field did not appear")?;
    session.click(&username).await?;
    session.fill(&username, &config.username).await?;
    session
        .click(&submit)
        .await
        .context("Failed to submit username")?;

    let password = jira::password_field();
    session
        .wait_for_visible(&password, timing.field_timeout)
        .await
        .context("Password field did not appear")?;
    session.fill(&password, &config.password).await?;
    session
        .click(&submit)
        .await
        .context("Failed to submit password")?;

    output::println("\n🔐 Verification code required!", stdout_additional)?;
    let code_field = jira::verification_code_field();
    session
        .wait_for_visible(&code_field, timing.element_timeout)
        .await
        .context("Verification code field did not appear")?;

    let code = codes.verification_code(stdout_additional)?;
    // A complete code submits the form without a button press.
    session.fill(&code_field, &code).await?;

    output::println("   ⏳ Waiting for login to complete...", stdout_additional)?;
    tokio::time::sleep(timing.login_settle).await;

    session
        .navigate(landing_url, timing.navigation_timeout)
        .await
        .context("Failed to load the tracker after login")?;
    tokio::time::sleep(timing.post_login_settle).await;

    tracing::debug!(user = %config.username, "login complete");
    Ok(())
}
