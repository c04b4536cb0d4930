use tokio::process::Command;
use tokio::runtime::Handle;

use super::{format_alert_body, Notifier, ALERT_TITLE};
use crate::models::Opportunity;

/// Surfaces alerts as desktop notifications by running an external command,
/// e.g. `notify-send`. The command receives the title and body as its last
/// two arguments.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program: String,
    args: Vec<String>,
}

impl DesktopNotifier {
    /// Build from a whitespace-separated command line such as
    /// `notify-send -u critical`. Returns `None` for a blank command.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_for(&self, opportunity: &Opportunity) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(ALERT_TITLE)
            .arg(format_alert_body(opportunity));
        cmd
    }
}

impl Notifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn notify(&self, opportunity: &Opportunity) {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("No async runtime — desktop alert dropped");
            return;
        };

        let mut cmd = self.command_for(opportunity);
        let program = self.program.clone();
        handle.spawn(async move {
            match cmd.status().await {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    tracing::warn!(program = %program, status = %status, "Desktop notifier exited non-zero");
                }
                Err(e) => {
                    tracing::warn!(program = %program, error = %e, "Failed to run desktop notifier");
                }
            }
        });
    }

    fn is_available(&self) -> bool {
        Handle::try_current().is_ok()
    }
}
