use std::process::{Command, Stdio};

use recado_core::config::NotifyConfig;
use tracing::warn;

/// Fire-and-forget desktop notification hook.
///
/// Failures are logged and swallowed; a broken notifier must never affect
/// the scheduler's control flow.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Shells out to a notifier command (`notify-send` by default), passing the
/// title and body as the two arguments.
pub struct CommandNotifier {
    command: String,
}

impl CommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Build the configured sink: the command notifier, or [`NullNotifier`]
    /// when notifications are disabled.
    pub fn from_config(cfg: &NotifyConfig) -> Box<dyn NotificationSink> {
        if cfg.enabled {
            Box::new(Self::new(cfg.command.clone()))
        } else {
            Box::new(NullNotifier)
        }
    }
}

impl NotificationSink for CommandNotifier {
    fn notify(&self, title: &str, body: &str) {
        let spawned = Command::new(&self.command)
            .arg(title)
            .arg(body)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                // Reap off the loop thread so the engine never waits on it.
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => {
                warn!(command = %self.command, "notification command failed to start: {e}");
            }
        }
    }
}

/// Discards every notification (headless hosts, tests).
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_does_not_panic_or_propagate() {
        let sink = CommandNotifier::new("recado-test-no-such-binary");
        sink.notify("title", "body");
    }

    #[test]
    fn disabled_config_yields_the_null_sink() {
        let cfg = NotifyConfig {
            enabled: false,
            command: "notify-send".to_string(),
        };
        // Just exercising the path: the null sink swallows everything.
        CommandNotifier::from_config(&cfg).notify("title", "body");
    }
}
