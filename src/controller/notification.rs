use {
    std::fmt,
    tracing::{error, info, warn},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Success => "sucesso",
            Level::Info => "info",
            Level::Warning => "aviso",
            Level::Error => "erro",
        };
        f.write_str(label)
    }
}

/// A user-facing message produced by a controller action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// Keeps every notification, oldest first.
impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Prints notifications to stdout and mirrors them into the log.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.level {
            Level::Success | Level::Info => info!(title = %notification.title, "{}", notification.message),
            Level::Warning => warn!(title = %notification.title, "{}", notification.message),
            Level::Error => error!(title = %notification.title, "{}", notification.message),
        }

        println!(
            "[{}] {}: {}",
            notification.level, notification.title, notification.message
        );
    }
}
