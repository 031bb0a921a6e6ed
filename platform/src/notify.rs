// Seam between services that need to tell the user something and whatever displays it.
use shared::models::NotificationKind;

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NotificationKind);
}
