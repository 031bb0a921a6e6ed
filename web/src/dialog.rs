// Blocking yes/no prompt supplied by the host.

pub trait Dialog: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Gives the same answer to every prompt. Used by headless hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticDialog(pub bool);

impl Dialog for StaticDialog {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, answer = self.0, "Confirmation answered automatically");
        self.0
    }
}
