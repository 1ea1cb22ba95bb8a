//! PaymentSessionController processor.
//!
//! The controller is responsible for:
//! - Opening the session, which creates the order exactly once
//! - Receiving `ModalEvent`s from the widget and the close button
//! - Driving the countdown while, and only while, the order awaits approval
//! - Executing the effects requested by the state machine (network calls,
//!   notifications, the success auto-close timer)
//! - Publishing a `SessionSnapshot` after every transition
//!
//! One controller runs per open modal. All timers are locals of
//! [`run()`](PaymentSessionController::run), so nothing outlives the session.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use motbook_sdk::config::PaymentPolicy;
use motbook_sdk::objects::{ApprovalDetails, BookingDraft, Confirmation};
use tokio::sync::watch;
use tokio::time::{Instant, Interval};
use tracing::{debug, info, warn};

use super::gateway::PaymentGateway;
use super::state::{
    CancelReason, Effect, PaymentSession, SessionEvent, SessionSnapshot, SessionState,
};
use crate::events::{ModalEvent, ModalEventReceiver, Notification, NotificationSender};

/// How a payment session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Paid or confirmed; the modal closed after the success delay.
    Completed(Confirmation),
    /// The order was abandoned and a cancellation was attempted.
    Cancelled(CancelReason),
    /// Closed with no order to cancel.
    Dismissed,
}

/// What woke the run loop.
enum Wake {
    Modal(Option<ModalEvent>),
    Tick,
    AutoClose,
}

/// Drives one [`PaymentSession`] against a [`PaymentGateway`].
pub struct PaymentSessionController {
    session: PaymentSession,
    gateway: Arc<dyn PaymentGateway>,
    notifications: NotificationSender,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl PaymentSessionController {
    /// Create a controller for a freshly submitted `draft`.
    ///
    /// # Arguments
    ///
    /// * `draft` - The validated booking, never mutated afterwards
    /// * `policy` - Timing and cash-completion policy
    /// * `gateway` - Backend calls for create, capture and cancel
    /// * `notifications` - Where user-facing toasts are sent
    pub fn new(
        draft: BookingDraft,
        policy: PaymentPolicy,
        gateway: Arc<dyn PaymentGateway>,
        notifications: NotificationSender,
    ) -> Self {
        let session = PaymentSession::new(draft, policy);
        let (state_tx, _) = watch::channel(SessionSnapshot::from(&session));
        Self {
            session,
            gateway,
            notifications,
            state_tx,
        }
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn session(&self) -> &PaymentSession {
        &self.session
    }

    /// Run the session until the modal closes.
    ///
    /// If every `ModalEvent` sender is dropped, the modal is treated as
    /// closed by the user.
    pub async fn run(mut self, mut modal_rx: ModalEventReceiver) -> SessionOutcome {
        let session_id = self.session.id();
        info!(
            %session_id,
            method = %self.session.draft().payment_method,
            slot = %self.session.draft().selected_time_slot,
            "Payment session opened"
        );

        let mut events_open = true;
        let mut countdown: Option<Interval> = None;
        let mut auto_close_at: Option<Instant> = None;

        let mut step = self.dispatch(SessionEvent::Open).await;

        loop {
            if let Some(delay) = step.auto_close {
                auto_close_at = Some(Instant::now() + delay);
            }
            if let Some(outcome) = step.closed {
                info!(%session_id, outcome = ?outcome, "Payment session closed");
                return outcome;
            }

            // The interval exists only while the order awaits approval.
            match (self.session.state(), countdown.is_some()) {
                (SessionState::Created { .. }, false) => {
                    let tick = self.session.policy().tick;
                    countdown = Some(tokio::time::interval_at(Instant::now() + tick, tick));
                    debug!(%session_id, "Countdown started");
                }
                (SessionState::Created { .. }, true) => {}
                (_, true) => {
                    countdown = None;
                    debug!(%session_id, "Countdown stopped");
                }
                (_, false) => {}
            }

            let wake = tokio::select! {
                biased;

                event = modal_rx.recv(), if events_open => Wake::Modal(event),

                _ = next_tick(&mut countdown) => Wake::Tick,

                _ = sleep_until(auto_close_at) => Wake::AutoClose,
            };

            step = match wake {
                Wake::Modal(Some(event)) => {
                    debug!(%session_id, event = ?event, "Received ModalEvent");
                    self.dispatch(modal_to_session_event(event)).await
                }
                Wake::Modal(None) => {
                    info!(%session_id, "Modal event channel closed");
                    events_open = false;
                    self.dispatch(SessionEvent::CloseRequested).await
                }
                Wake::Tick => self.dispatch(SessionEvent::Tick).await,
                Wake::AutoClose => {
                    auto_close_at = None;
                    self.dispatch(SessionEvent::AutoCloseElapsed).await
                }
            };
        }
    }

    /// Apply `event` and every event produced by the resulting effects.
    async fn dispatch(&mut self, event: SessionEvent) -> Step {
        let mut step = Step::default();
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let before = self.session.state().clone();
            let effects = self.session.apply(event);
            if self.session.state() != &before {
                debug!(
                    session_id = %self.session.id(),
                    from = %before.status(),
                    to = %self.session.status(),
                    "Session transition"
                );
                self.state_tx.send_replace(SessionSnapshot::from(&self.session));
            }

            for effect in effects {
                match effect {
                    Effect::CreateOrder => queue.push_back(self.create_order().await),
                    Effect::CaptureOrder(details) => {
                        queue.push_back(self.capture_order(details).await)
                    }
                    Effect::CancelOrder(order_id) => {
                        queue.push_back(self.cancel_order(&order_id).await)
                    }
                    Effect::Notify(notification) => self.notify(notification).await,
                    Effect::ScheduleAutoClose(delay) => step.auto_close = Some(delay),
                    Effect::CloseModal => step.closed = Some(outcome_of(&before)),
                }
            }
        }

        step
    }

    async fn create_order(&self) -> SessionEvent {
        let session_id = self.session.id();
        match self.gateway.create_order(self.session.draft()).await {
            Ok(order) => {
                info!(
                    %session_id,
                    booking_id = %order.booking_id,
                    order_id = ?order.paypal_order_id,
                    "Order created"
                );
                SessionEvent::OrderCreated(order)
            }
            Err(e) => {
                warn!(%session_id, error = %e, "Order creation failed");
                SessionEvent::OrderCreationFailed(e.backend_message().map(str::to_string))
            }
        }
    }

    async fn capture_order(&self, details: ApprovalDetails) -> SessionEvent {
        let session_id = self.session.id();
        match self.gateway.capture_order(&details).await {
            Ok(()) => {
                // Approvals without a purchase unit are receipted at the quoted price.
                let confirmation = details.confirmation().unwrap_or_else(|| Confirmation {
                    invoice_number: details.id.clone(),
                    amount: self.session.draft().total_price,
                });
                info!(
                    %session_id,
                    order_id = %details.id,
                    amount = %confirmation.amount,
                    "Payment captured"
                );
                SessionEvent::Captured(confirmation)
            }
            Err(e) => {
                warn!(%session_id, order_id = %details.id, error = %e, "Payment capture failed");
                SessionEvent::CaptureFailed
            }
        }
    }

    async fn cancel_order(&self, order_id: &str) -> SessionEvent {
        let session_id = self.session.id();
        match self.gateway.cancel_order(order_id).await {
            Ok(()) => {
                info!(%session_id, %order_id, "Order cancelled");
                SessionEvent::CancelFinished(true)
            }
            Err(e) => {
                warn!(%session_id, %order_id, error = %e, "Order cancellation failed");
                SessionEvent::CancelFinished(false)
            }
        }
    }

    async fn notify(&self, notification: Notification) {
        if let Err(e) = self.notifications.send(notification).await {
            warn!(
                session_id = %self.session.id(),
                error = %e,
                "Failed to send notification, receiver dropped"
            );
        }
    }
}

/// Result of one dispatch round.
#[derive(Debug, Default)]
struct Step {
    auto_close: Option<Duration>,
    closed: Option<SessionOutcome>,
}

fn modal_to_session_event(event: ModalEvent) -> SessionEvent {
    match event {
        ModalEvent::Approved(details) => SessionEvent::Approved(details),
        ModalEvent::Cancelled | ModalEvent::Close => SessionEvent::CloseRequested,
    }
}

fn outcome_of(closed_from: &SessionState) -> SessionOutcome {
    match closed_from {
        SessionState::Completed { confirmation } => {
            SessionOutcome::Completed(confirmation.clone())
        }
        SessionState::Cancelling { reason, .. } => SessionOutcome::Cancelled(*reason),
        _ => SessionOutcome::Dismissed,
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NotificationReceiver, modal_event_channel, notification_channel};
    use crate::payment::gateway::GatewayError;
    use crate::payment::state::{CAPTURE_FAILED, PAYMENT_CANCELLED, SessionStatus};
    use async_trait::async_trait;
    use motbook_sdk::client::ClientError;
    use motbook_sdk::objects::{CreatedOrder, DEFAULT_TOTAL_PRICE, PaymentMethod};
    use std::sync::Mutex;
    use time::macros::date;

    #[derive(Default)]
    struct FakeGateway {
        paypal_order_id: Option<String>,
        fail_create: Option<String>,
        fail_capture: bool,
        creates: Mutex<u32>,
        captures: Mutex<Vec<String>>,
        cancels: Mutex<Vec<String>>,
    }

    impl FakeGateway {
        fn card() -> Self {
            Self {
                paypal_order_id: Some("PO-1".to_string()),
                ..Self::default()
            }
        }

        fn rejected(message: &str) -> GatewayError {
            GatewayError::Client(ClientError::Rejected {
                status_code: 400,
                message: message.to_string(),
            })
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_order(&self, _draft: &BookingDraft) -> Result<CreatedOrder, GatewayError> {
            *self.creates.lock().unwrap() += 1;
            if let Some(message) = &self.fail_create {
                return Err(Self::rejected(message));
            }
            Ok(CreatedOrder {
                booking_id: "b-1".to_string(),
                paypal_order_id: self.paypal_order_id.clone(),
            })
        }

        async fn capture_order(&self, details: &ApprovalDetails) -> Result<(), GatewayError> {
            self.captures.lock().unwrap().push(details.id.clone());
            if self.fail_capture {
                return Err(Self::rejected("INSTRUMENT_DECLINED"));
            }
            Ok(())
        }

        async fn cancel_order(&self, order_id: &str) -> Result<(), GatewayError> {
            self.cancels.lock().unwrap().push(order_id.to_string());
            Ok(())
        }
    }

    fn draft(method: PaymentMethod) -> BookingDraft {
        BookingDraft {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@example.com".into(),
            contact_number: "07123456789".into(),
            make_and_model: "Ford Focus".into(),
            registration_no: "AB12 CDE".into(),
            selected_date: date!(2025 - 03 - 04),
            selected_time_slot: "09:30".into(),
            how_did_you_hear_about_us: None,
            aware_of_cancellation_policy: true,
            total_price: DEFAULT_TOTAL_PRICE,
            payment_method: method,
        }
    }

    fn controller(
        gateway: Arc<FakeGateway>,
        method: PaymentMethod,
    ) -> (PaymentSessionController, NotificationReceiver) {
        let (notify_tx, notify_rx) = notification_channel();
        let controller = PaymentSessionController::new(
            draft(method),
            PaymentPolicy::default(),
            gateway,
            notify_tx,
        );
        (controller, notify_rx)
    }

    fn drain(rx: &mut NotificationReceiver) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_card_payment_completes_and_auto_closes() {
        let gateway = Arc::new(FakeGateway::card());
        let (controller, mut notify_rx) = controller(gateway.clone(), PaymentMethod::PayPal);
        let mut state_rx = controller.subscribe();
        let (modal_tx, modal_rx) = modal_event_channel();
        let handle = tokio::spawn(controller.run(modal_rx));

        state_rx
            .wait_for(|s| s.status == SessionStatus::Created)
            .await
            .unwrap();

        let started = Instant::now();
        let details = ApprovalDetails::new("PO-1", DEFAULT_TOTAL_PRICE, "GBP");
        modal_tx.send(ModalEvent::Approved(details)).await.unwrap();

        let outcome = handle.await.unwrap();
        let SessionOutcome::Completed(confirmation) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(confirmation.invoice_number, "PO-1");
        assert_eq!(confirmation.amount, DEFAULT_TOTAL_PRICE);
        assert!(started.elapsed() >= Duration::from_secs(10));

        assert_eq!(*gateway.creates.lock().unwrap(), 1);
        assert_eq!(*gateway.captures.lock().unwrap(), vec!["PO-1".to_string()]);
        assert!(gateway.cancels.lock().unwrap().is_empty());
        assert!(drain(&mut notify_rx).is_empty());
        assert_eq!(state_rx.borrow().status, SessionStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_approval_without_amount_is_captured_at_quoted_price() {
        let gateway = Arc::new(FakeGateway::card());
        let (controller, _notify_rx) = controller(gateway.clone(), PaymentMethod::PayPal);
        let mut state_rx = controller.subscribe();
        let (modal_tx, modal_rx) = modal_event_channel();
        let handle = tokio::spawn(controller.run(modal_rx));

        state_rx
            .wait_for(|s| s.status == SessionStatus::Created)
            .await
            .unwrap();

        let details = ApprovalDetails {
            id: "PO-1".to_string(),
            status: Some("APPROVED".to_string()),
            purchase_units: Vec::new(),
        };
        modal_tx.send(ModalEvent::Approved(details)).await.unwrap();

        let outcome = handle.await.unwrap();
        assert_eq!(
            outcome,
            SessionOutcome::Completed(Confirmation {
                invoice_number: "PO-1".to_string(),
                amount: DEFAULT_TOTAL_PRICE,
            })
        );
        assert_eq!(*gateway.captures.lock().unwrap(), vec!["PO-1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_cancels_once() {
        let gateway = Arc::new(FakeGateway::card());
        let (controller, mut notify_rx) = controller(gateway.clone(), PaymentMethod::PayPal);
        let (_modal_tx, modal_rx) = modal_event_channel();

        let started = Instant::now();
        let outcome = controller.run(modal_rx).await;

        assert_eq!(outcome, SessionOutcome::Cancelled(CancelReason::Expired));
        assert!(started.elapsed() >= Duration::from_secs(600));
        assert!(started.elapsed() < Duration::from_secs(602));
        assert_eq!(*gateway.cancels.lock().unwrap(), vec!["PO-1".to_string()]);
        assert!(gateway.captures.lock().unwrap().is_empty());
        assert_eq!(
            drain(&mut notify_rx),
            vec![Notification::info(PAYMENT_CANCELLED)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cash_completes_without_widget() {
        let gateway = Arc::new(FakeGateway::default());
        let (controller, _notify_rx) = controller(gateway.clone(), PaymentMethod::Cash);
        let mut state_rx = controller.subscribe();
        let (_modal_tx, modal_rx) = modal_event_channel();

        let handle = tokio::spawn(controller.run(modal_rx));
        state_rx
            .wait_for(|s| s.status == SessionStatus::Completed)
            .await
            .unwrap();

        let outcome = handle.await.unwrap();
        let SessionOutcome::Completed(confirmation) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(confirmation.invoice_number, "b-1");
        assert_eq!(*gateway.creates.lock().unwrap(), 1);
        assert!(gateway.captures.lock().unwrap().is_empty());
        assert!(gateway.cancels.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_close_cancels_order() {
        let gateway = Arc::new(FakeGateway::card());
        let (controller, mut notify_rx) = controller(gateway.clone(), PaymentMethod::PayPal);
        let mut state_rx = controller.subscribe();
        let (modal_tx, modal_rx) = modal_event_channel();
        let handle = tokio::spawn(controller.run(modal_rx));

        state_rx
            .wait_for(|s| s.status == SessionStatus::Created)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        modal_tx.send(ModalEvent::Cancelled).await.unwrap();

        let outcome = handle.await.unwrap();
        assert_eq!(outcome, SessionOutcome::Cancelled(CancelReason::UserClosed));
        assert_eq!(*gateway.cancels.lock().unwrap(), vec!["PO-1".to_string()]);
        assert_eq!(
            drain(&mut notify_rx),
            vec![Notification::info(PAYMENT_CANCELLED)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_failure_waits_for_dismissal() {
        let gateway = Arc::new(FakeGateway {
            fail_capture: true,
            ..FakeGateway::card()
        });
        let (controller, mut notify_rx) = controller(gateway.clone(), PaymentMethod::PayPal);
        let mut state_rx = controller.subscribe();
        let (modal_tx, modal_rx) = modal_event_channel();
        let handle = tokio::spawn(controller.run(modal_rx));

        state_rx
            .wait_for(|s| s.status == SessionStatus::Created)
            .await
            .unwrap();
        let details = ApprovalDetails::new("PO-1", DEFAULT_TOTAL_PRICE, "GBP");
        modal_tx.send(ModalEvent::Approved(details)).await.unwrap();

        let snapshot = state_rx
            .wait_for(|s| s.status == SessionStatus::Error)
            .await
            .unwrap()
            .clone();
        assert!(snapshot.confirmation.is_none());

        // The error state stays put: no countdown, no expiry.
        tokio::time::sleep(Duration::from_secs(900)).await;
        assert!(!handle.is_finished());
        assert!(gateway.cancels.lock().unwrap().is_empty());

        modal_tx.send(ModalEvent::Close).await.unwrap();
        let outcome = handle.await.unwrap();
        assert_eq!(outcome, SessionOutcome::Cancelled(CancelReason::UserClosed));
        assert_eq!(
            drain(&mut notify_rx),
            vec![
                Notification::error(CAPTURE_FAILED),
                Notification::info(PAYMENT_CANCELLED)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_creation_failure_surfaces_backend_message() {
        let gateway = Arc::new(FakeGateway {
            fail_create: Some("Slot already booked".to_string()),
            ..FakeGateway::card()
        });
        let (controller, mut notify_rx) = controller(gateway.clone(), PaymentMethod::PayPal);
        let mut state_rx = controller.subscribe();
        let (modal_tx, modal_rx) = modal_event_channel();
        let handle = tokio::spawn(controller.run(modal_rx));

        state_rx
            .wait_for(|s| s.status == SessionStatus::Error)
            .await
            .unwrap();
        modal_tx.send(ModalEvent::Close).await.unwrap();

        assert_eq!(handle.await.unwrap(), SessionOutcome::Dismissed);
        assert_eq!(*gateway.creates.lock().unwrap(), 1);
        assert!(gateway.cancels.lock().unwrap().is_empty());
        assert_eq!(
            drain(&mut notify_rx),
            vec![Notification::error("Slot already booked")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_modal_cancels_order() {
        let gateway = Arc::new(FakeGateway::card());
        let (controller, _notify_rx) = controller(gateway.clone(), PaymentMethod::PayPal);
        let mut state_rx = controller.subscribe();
        let (modal_tx, modal_rx) = modal_event_channel();
        let handle = tokio::spawn(controller.run(modal_rx));

        state_rx
            .wait_for(|s| s.status == SessionStatus::Created)
            .await
            .unwrap();
        drop(modal_tx);

        let outcome = handle.await.unwrap();
        assert_eq!(outcome, SessionOutcome::Cancelled(CancelReason::UserClosed));
        assert_eq!(*gateway.cancels.lock().unwrap(), vec!["PO-1".to_string()]);
    }
}
