//! Identifiers of the tracker's web UI elements this tool drives.
//!
//! These mirror the test ids and labels the hosted tracker renders today; when
//! the tracker's UI changes, this is the file to update.

use crate::session::Target;

pub mod test_ids {
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const LOGIN_SUBMIT: &str = "login-submit-idf-testid";
    pub const ISSUE_MENU_TRIGGER: &str = "issue-meatball-menu.ui.dropdown-trigger.button";
    pub const TIME_SPENT: &str = "timelog-textfield-Time spent";
    pub const SAVE_WORKLOG: &str = "issue.common.component.log-time-modal.modal.footer.save-button";
}

/// Substring of the verification code input's label.
pub const VERIFICATION_CODE_LABEL: &str = "-digit verification code";
/// Accessible name of the menu entry that opens the time-entry form.
pub const LOG_WORK_MENU_ITEM: &str = "Log work";
/// Smallest duration the time-spent field accepts.
pub const MINIMAL_WORKLOG: &str = "1m";

/// Detail page of an issue. `base_url` carries no trailing slash.
pub fn issue_url(base_url: &str, key: &str) -> String {
    format!("{base_url}/browse/{key}")
}

pub fn username_field() -> Target {
    Target::test_id(test_ids::USERNAME)
}

pub fn password_field() -> Target {
    Target::test_id(test_ids::PASSWORD)
}

pub fn login_submit() -> Target {
    Target::test_id(test_ids::LOGIN_SUBMIT)
}

pub fn verification_code_field() -> Target {
    Target::label(VERIFICATION_CODE_LABEL)
}

pub fn issue_menu_trigger() -> Target {
    Target::test_id(test_ids::ISSUE_MENU_TRIGGER)
}

pub fn log_work_item() -> Target {
    Target::role("menuitem", LOG_WORK_MENU_ITEM)
}

pub fn time_spent_field() -> Target {
    Target::test_id(test_ids::TIME_SPENT)
}

pub fn save_worklog_button() -> Target {
    Target::test_id(test_ids::SAVE_WORKLOG)
}
