//! The interactive loop.
//!
//! Commands run on the main task; a separate printer task owns the
//! notification stream so reminders show up while the prompt is waiting.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use golendar_core::notifier::channel;
use golendar_core::{
    Calendar, Config, CoreError, HistoryLog, JsonStorage, NotificationStream, ReminderFilter,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::shell::{parse_line, ShellCommand, HELP};

const PROMPT: &str = "> ";

enum Flow {
    Continue,
    Exit,
}

struct Session {
    calendar: Calendar,
    history: Arc<HistoryLog>,
}

impl Session {
    /// Print a line and keep it in the history.
    fn say(&self, message: impl Into<String>) {
        let message = message.into();
        println!("{message}");
        self.history.record(message);
    }

    fn fail(&self, err: impl std::fmt::Display) {
        error!(error = %err, "command failed");
        self.say(format!("error: {err}"));
    }

    fn persist(&self) {
        if let Err(e) = self.calendar.save() {
            self.fail(e);
        }
        if let Err(e) = self.history.save() {
            self.fail(e);
        }
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<Flow, CoreError> {
        match command {
            ShellCommand::Add {
                title,
                date,
                priority,
            } => {
                let msg = self.calendar.add_event(&title, &date, &priority)?;
                self.say(msg);
            }
            ShellCommand::List => self.say(self.calendar.show_events()),
            ShellCommand::Remove { event } => {
                let id = self.calendar.resolve(&event.join(" "))?;
                let msg = self.calendar.delete_event(&id)?;
                self.say(msg);
            }
            ShellCommand::Update {
                event,
                title,
                date,
                priority,
            } => {
                let id = self.calendar.resolve(&event)?;
                let msg = self.calendar.edit_event(&id, &title, &date, &priority)?;
                self.say(msg);
            }
            ShellCommand::AddReminder {
                event,
                message,
                date,
            } => {
                let id = self.calendar.resolve(&event)?;
                let msg = self.calendar.set_event_reminder(&id, &message, &date)?;
                self.say(msg);
            }
            ShellCommand::StopReminder { event } => {
                let id = self
                    .calendar
                    .resolve_with(&event.join(" "), ReminderFilter::With)?;
                let msg = self.calendar.cancel_event_reminder(&id)?;
                self.say(msg);
            }
            ShellCommand::RemoveReminder { event } => {
                let id = self
                    .calendar
                    .resolve_with(&event.join(" "), ReminderFilter::With)?;
                let msg = self.calendar.remove_event_reminder(&id)?;
                self.say(msg);
            }
            ShellCommand::Notify { message } => {
                self.calendar.notify(message.join(" ")).await?;
            }
            ShellCommand::History => {
                let shown = self.history.show();
                if shown.is_empty() {
                    self.say("history is empty");
                } else {
                    // Printed only; recording a dump of the log into itself
                    // would double it on every call.
                    println!("{shown}");
                }
            }
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Handle one raw input line.
    async fn handle(&mut self, line: &str) -> Flow {
        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue,
            Err(message) => {
                self.history.record(line);
                // clap's rendering already ends with a usage hint.
                println!("{}", message.trim_end());
                self.history.record(message.trim_end());
                warn!(input = %line, "unparsed command");
                return Flow::Continue;
            }
        };

        self.history.record(line);
        debug!(?command, "executing");
        let flow = match self.execute(command).await {
            Ok(flow) => flow,
            Err(e) => {
                self.fail(e);
                Flow::Continue
            }
        };
        self.persist();
        flow
    }
}

fn spawn_printer(mut stream: NotificationStream, history: Arc<HistoryLog>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            println!("{message}");
            history.record(message);
        }
        debug!("notification stream drained");
    })
}

fn prompt() {
    print!("{PROMPT}");
    // A failed flush only loses the prompt.
    let _ = std::io::stdout().flush();
}

/// Run the session until `exit`, end of input or Ctrl-C.
pub async fn run(config: &Config, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (notifier, stream) = channel(config.notifications.capacity);
    let calendar = Calendar::new(
        JsonStorage::new(data_dir.join(&config.storage.events_file)),
        notifier,
    );
    let history = Arc::new(HistoryLog::new(JsonStorage::new(
        data_dir.join(&config.storage.history_file),
    )));
    let mut session = Session {
        calendar,
        history: Arc::clone(&history),
    };

    history.load()?;
    session.calendar.load()?;
    if config.reminders.rearm_on_load {
        for status in session.calendar.rearm_reminders() {
            session.say(status);
        }
    }
    info!(
        events = session.calendar.len(),
        dir = %data_dir.display(),
        "session started"
    );

    let printer = spawn_printer(stream, Arc::clone(&history));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        prompt();
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut ctrl_c => {
                println!();
                info!("interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        if let Flow::Exit = session.handle(&line).await {
            break;
        }
    }

    // Save and close the sink, let the printer drain, then write the
    // history it may have appended to.
    let saved = session.calendar.shutdown();
    if let Err(e) = printer.await {
        warn!(error = %e, "notification printer ended abnormally");
    }
    history.save()?;
    saved?;
    info!("session closed");
    Ok(())
}
