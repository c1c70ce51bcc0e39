//! Parsing of interactive command lines.
//!
//! A line is split shell-style (quotes group words) and the words are fed to
//! clap, so each command gets the same argument checking as the binary itself.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "golendar",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Add an event: add "title" "date" priority
    Add {
        title: String,
        date: String,
        priority: String,
    },
    /// Show all events
    List,
    /// Delete an event
    Remove {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        event: Vec<String>,
    },
    /// Edit an event: update <event> "title" "date" priority
    Update {
        event: String,
        title: String,
        date: String,
        priority: String,
    },
    /// Attach a reminder: add_rm <event> "message" "date"
    #[command(name = "add_rm")]
    AddReminder {
        event: String,
        message: String,
        date: String,
    },
    /// Stop a reminder but keep it attached
    #[command(name = "stop_rm")]
    StopReminder {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        event: Vec<String>,
    },
    /// Stop and detach a reminder
    #[command(name = "remove_rm")]
    RemoveReminder {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        event: Vec<String>,
    },
    /// Send a message through the notification queue
    Notify {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Show input/output history
    History,
    /// Show help
    Help,
    /// Quit
    Exit,
}

pub const HELP: &str = r#"add       - add an event: add "title" "date" priority
list      - show events as id - title - date - priority
remove    - delete an event: remove <event>
update    - edit an event: update <event> "title" "date" priority
add_rm    - attach a reminder: add_rm <event> "message" "date"
stop_rm   - stop a reminder, keeping it attached: stop_rm <event>
remove_rm - stop and remove a reminder: remove_rm <event>
notify    - queue a message for the notification printer
history   - show input/output history
help      - show this help
exit      - save and quit

<event> is an id, an id prefix of 4+ characters, or the start of a title.
Dates: 2026-10-19 14:30, 19.10.2026 14:30, 2026-10-19 or RFC 3339.
Priority: low, medium or high."#;

/// Split a line into words. Double and single quotes group words; inside
/// double quotes a backslash escapes the next character.
pub fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => return Err("unterminated escape".into()),
                        },
                        Some(other) => current.push(other),
                        None => return Err("unclosed double quote".into()),
                    }
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(other) => current.push(other),
                        None => return Err("unclosed single quote".into()),
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse one input line. `Ok(None)` means the line was blank.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut words = split_args(line)?;
    let Some(first) = words.first_mut() else {
        return Ok(None);
    };
    *first = first.to_lowercase();
    ShellLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.to_string())
}
