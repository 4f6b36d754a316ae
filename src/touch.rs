use crate::config::Config;
use crate::jira;
use crate::session::{ESCAPE, InteractiveSession, Target};

/// Trigger clicks allowed before giving up on the issue's action menu.
pub const MENU_OPEN_ATTEMPTS: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum TouchError {
    #[error("Menu didn't open after {attempts} attempts")]
    MenuNeverOpened { attempts: u32 },
    #[error(transparent)]
    Session(#[from] anyhow::Error),
}

/// Logs a one-minute worklog on `key`, which bumps the issue's update time.
pub async fn touch_issue<S>(session: &mut S, config: &Config, key: &str) -> Result<(), TouchError>
where
    S: InteractiveSession + ?Sized,
{
    let timing = &config.timing;

    session
        .navigate(
            &jira::issue_url(&config.base_url, key),
            timing.navigation_timeout,
        )
        .await?;

    let log_work = jira::log_work_item();
    open_menu(session, config, &jira::issue_menu_trigger(), &log_work).await?;

    session.click(&log_work).await?;
    tokio::time::sleep(timing.log_work_settle).await;

    let time_spent = jira::time_spent_field();
    session
        .wait_for_visible(&time_spent, timing.field_timeout)
        .await?;
    session.fill(&time_spent, jira::MINIMAL_WORKLOG).await?;
    tokio::time::sleep(timing.fill_settle).await;

    let save = jira::save_worklog_button();
    session.wait_for_visible(&save, timing.field_timeout).await?;
    session.click(&save).await?;
    tokio::time::sleep(timing.save_settle).await;

    Ok(())
}

/// Clicks `trigger` until `item` shows up. A miss is dismissed with Escape
/// before the next click so half-open menus do not pile up.
async fn open_menu<S>(
    session: &mut S,
    config: &Config,
    trigger: &Target,
    item: &Target,
) -> Result<(), TouchError>
where
    S: InteractiveSession + ?Sized,
{
    let timing = &config.timing;
    for attempt in 1..=MENU_OPEN_ATTEMPTS {
        session
            .wait_for_visible(trigger, timing.element_timeout)
            .await?;
        session.click(trigger).await?;
        tokio::time::sleep(timing.menu_settle).await;

        if session.is_visible(item).await? {
            tracing::debug!(attempt, "issue menu opened");
            return Ok(());
        }

        tracing::debug!(attempt, "issue menu still closed, dismissing");
        session.press_key(ESCAPE).await?;
        tokio::time::sleep(timing.dismiss_settle).await;
    }
    Err(TouchError::MenuNeverOpened {
        attempts: MENU_OPEN_ATTEMPTS,
    })
}
