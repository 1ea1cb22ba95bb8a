//! Event system connecting the user interface and the core.
//!
//! # Event Flow
//!
//! 1. The UI (or the payment widget) sends `ModalEvent`s -> `PaymentSessionController`
//! 2. The controller and the forms emit `Notification`s -> UI
//! 3. The controller publishes `SessionSnapshot`s on a watch channel -> UI

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, ModalEventReceiver, ModalEventSender, NotificationReceiver,
    NotificationSender, modal_event_channel, notification_channel,
};

pub use types::{ModalEvent, Notification, NotificationLevel};
