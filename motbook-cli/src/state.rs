//! Application state shared by all commands.

use crate::config::LoadedConfig;
use motbook_core::admin::{CredentialStore, SessionContext};
use motbook_core::events::{NotificationSender, notification_channel};
use motbook_sdk::client::{AdminClient, BookingClient, ClientError};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything a command needs: configuration, backend clients and the
/// notification sink.
pub struct AppState {
    pub config: LoadedConfig,
    pub booking: BookingClient,
    pub admin: AdminClient,
    pub notifications: NotificationSender,
    printer: JoinHandle<()>,
}

impl AppState {
    /// Build the clients from `config` and start rendering notifications.
    pub fn new(config: LoadedConfig) -> Result<Self, ClientError> {
        let booking = BookingClient::from_config(&config.api)?;
        let admin = AdminClient::from_config(&config.api)?;
        let (notifications, notification_rx) = notification_channel();
        Ok(Self {
            booking,
            admin,
            notifications,
            printer: crate::render::spawn_notification_printer(notification_rx),
            config,
        })
    }

    /// A fresh session context over the configured credential store.
    ///
    /// The context starts unauthenticated; call `init()` to restore a
    /// stored session.
    pub fn session_context(&self) -> SessionContext {
        SessionContext::new(
            Arc::new(self.admin.clone()),
            CredentialStore::new(&self.config.credentials_path),
        )
    }

    /// The admin client authorised with the session's access token.
    pub fn authorized_admin(&self, session: &SessionContext) -> AdminClient {
        let mut client = self.admin.clone();
        client.set_access_token(session.access_token().map(str::to_string));
        client
    }

    /// Drop the last notification sender and wait until every pending
    /// notification has been printed.
    pub async fn finish(self) {
        let Self {
            notifications,
            printer,
            ..
        } = self;
        drop(notifications);
        if let Err(e) = printer.await {
            tracing::warn!(error = %e, "Notification printer stopped unexpectedly");
        }
    }
}
