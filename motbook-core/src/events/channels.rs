//! Event channel factories and handles.

use super::types::{ModalEvent, Notification};
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// A modal produces a handful of events per session, so this is generous.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Sender handle for ModalEvent events.
pub type ModalEventSender = mpsc::Sender<ModalEvent>;
/// Receiver handle for ModalEvent events.
pub type ModalEventReceiver = mpsc::Receiver<ModalEvent>;

/// Sender handle for notifications.
pub type NotificationSender = mpsc::Sender<Notification>;
/// Receiver handle for notifications.
pub type NotificationReceiver = mpsc::Receiver<Notification>;

/// Create a new ModalEvent channel.
///
/// One channel per open modal; the controller owns the receiver.
pub fn modal_event_channel() -> (ModalEventSender, ModalEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new notification channel.
///
/// Multiple senders can be cloned from the returned sender.
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
