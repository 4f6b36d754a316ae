use crate::config::ConfigKey;

/// Enum representing CLI commands
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Touch every pending key. `keys_file` overrides `KEYS_FILE`.
    Touch { keys_file: Option<String> },
    /// List pending keys without opening a browser.
    Pending { keys_file: Option<String> },
    Help,
    Unknown(String),
}

const COMMANDS: &str = "\
Usage: jira-touch [touch [KEYS_FILE]]
       jira-touch pending [KEYS_FILE]
       jira-touch help

Settings are read from the environment or a .env file:";

/// Help text listing the commands and every setting.
pub fn usage() -> String {
    let mut text = String::from(COMMANDS);
    for key in ConfigKey::all() {
        let required = if ConfigKey::required().contains(key) {
            " (required)"
        } else {
            ""
        };
        text.push_str(&format!(
            "\n  {:<15} {}{}",
            key.as_str(),
            key.description(),
            required
        ));
    }
    text
}

/// Parse command line arguments and return a Command
///
/// # Arguments
/// * `args` - Command line arguments (including program name)
///
/// # Returns
/// * `Command` - The parsed command
pub fn parse_args(args: &[String]) -> Command {
    match args.len() {
        0 | 1 => Command::Touch { keys_file: None },
        2 => match args[1].as_str() {
            "touch" => Command::Touch { keys_file: None },
            "pending" => Command::Pending { keys_file: None },
            "help" | "-h" | "--help" => Command::Help,
            cmd => Command::Unknown(cmd.to_string()),
        },
        3 => match (args[1].as_str(), args[2].as_str()) {
            (_, path) if path.starts_with('-') => {
                Command::Unknown(format!("Unexpected option {}", path))
            }
            ("touch", path) => Command::Touch {
                keys_file: Some(path.to_string()),
            },
            ("pending", path) => Command::Pending {
                keys_file: Some(path.to_string()),
            },
            (cmd, _) => Command::Unknown(cmd.to_string()),
        },
        _ => Command::Unknown(args[1..].join(" ")),
    }
}
