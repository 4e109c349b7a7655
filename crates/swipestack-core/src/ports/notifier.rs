//! Notifier port - ユーザー向け通知（トースト）

use crate::domain::Notification;

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
