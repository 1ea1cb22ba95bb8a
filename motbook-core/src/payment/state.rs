//! Payment session state machine.
//!
//! [`PaymentSession::apply`] is a pure transition function: it consumes one
//! [`SessionEvent`], moves the session to its next [`SessionState`] and
//! returns the [`Effect`]s the driver must execute. No I/O happens here,
//! which keeps every transition rule unit-testable without a runtime.

use std::time::Duration;

use motbook_sdk::config::PaymentPolicy;
use motbook_sdk::objects::{ApprovalDetails, BookingDraft, Confirmation, CreatedOrder};
use tracing::debug;
use uuid::Uuid;

use super::countdown::{Countdown, CountdownTick};
use crate::events::Notification;

/// Shown when order creation fails without a backend message.
pub const CREATE_ORDER_FAILED: &str = "Failed to create order";
pub const CAPTURE_FAILED: &str = "Payment capture failed";
pub const PAYMENT_CANCELLED: &str = "Payment cancelled";
pub const CANCEL_FAILED: &str = "Failed to cancel payment";

/// Externally visible status of a payment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Pending,
    Created,
    Processing,
    Completed,
    Error,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "pending"),
            SessionStatus::Created => write!(f, "created"),
            SessionStatus::Processing => write!(f, "processing"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Error => write!(f, "error"),
        }
    }
}

/// Network step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStep {
    Create,
    Capture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub step: FailedStep,
    pub message: String,
}

/// Why a created order is being cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    UserClosed,
    Expired,
}

/// Internal state of a payment session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No order yet. `creating` is set while the creation call is in flight.
    Pending { creating: bool },
    /// A provider order exists and awaits the payer.
    Created {
        order_id: String,
        countdown: Countdown,
    },
    /// Capture in flight.
    Processing { order_id: String },
    Completed { confirmation: Confirmation },
    /// The user must dismiss the session. `order_id` is set when an order
    /// was created before the failure.
    Failed {
        failure: Failure,
        order_id: Option<String>,
    },
    /// Best-effort cancellation of an abandoned order in flight; the session
    /// returns to `Pending` once it finishes.
    Cancelling {
        order_id: String,
        reason: CancelReason,
    },
}

impl SessionState {
    pub fn initial() -> Self {
        SessionState::Pending { creating: false }
    }

    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Pending { .. } => SessionStatus::Pending,
            SessionState::Created { .. } | SessionState::Cancelling { .. } => {
                SessionStatus::Created
            }
            SessionState::Processing { .. } => SessionStatus::Processing,
            SessionState::Completed { .. } => SessionStatus::Completed,
            SessionState::Failed { .. } => SessionStatus::Error,
        }
    }

    /// Provider order held by the session, if any.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            SessionState::Created { order_id, .. }
            | SessionState::Processing { order_id }
            | SessionState::Cancelling { order_id, .. } => Some(order_id),
            SessionState::Failed { order_id, .. } => order_id.as_deref(),
            SessionState::Pending { .. } | SessionState::Completed { .. } => None,
        }
    }

    /// The running countdown; only `Created` has one.
    pub fn countdown(&self) -> Option<&Countdown> {
        match self {
            SessionState::Created { countdown, .. } => Some(countdown),
            _ => None,
        }
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        match self {
            SessionState::Completed { confirmation } => Some(confirmation),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            SessionState::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The modal opened.
    Open,
    OrderCreated(CreatedOrder),
    /// Order creation failed; carries the backend message, if any.
    OrderCreationFailed(Option<String>),
    /// One countdown step elapsed.
    Tick,
    Approved(ApprovalDetails),
    Captured(Confirmation),
    CaptureFailed,
    /// Close button or widget cancel callback.
    CloseRequested,
    /// The cancellation call returned; `true` on success.
    CancelFinished(bool),
    /// The success delay elapsed.
    AutoCloseElapsed,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CreateOrder,
    CaptureOrder(ApprovalDetails),
    CancelOrder(String),
    Notify(Notification),
    ScheduleAutoClose(Duration),
    CloseModal,
}

/// One booking-payment attempt of an open modal.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    id: Uuid,
    draft: BookingDraft,
    policy: PaymentPolicy,
    state: SessionState,
}

impl PaymentSession {
    pub fn new(draft: BookingDraft, policy: PaymentPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            draft,
            policy,
            state: SessionState::initial(),
        }
    }

    /// Client-side identifier used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn policy(&self) -> &PaymentPolicy {
        &self.policy
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    /// Apply `event` and return the effects to execute, in order.
    ///
    /// Events that make no sense in the current state are ignored and
    /// produce no effects.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        let state = std::mem::replace(&mut self.state, SessionState::initial());
        let (next, effects) = self.transition(state, event);
        self.state = next;
        effects
    }

    fn transition(&self, state: SessionState, event: SessionEvent) -> (SessionState, Vec<Effect>) {
        use SessionEvent as E;
        use SessionState as S;

        match (state, event) {
            (S::Pending { creating: false }, E::Open) => {
                (S::Pending { creating: true }, vec![Effect::CreateOrder])
            }

            (S::Pending { creating: true }, E::OrderCreated(order)) => self.order_created(order),

            (S::Pending { creating: true }, E::OrderCreationFailed(message)) => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| CREATE_ORDER_FAILED.to_string());
                Self::fail(FailedStep::Create, message, None)
            }

            (S::Created { order_id, mut countdown }, E::Tick) => match countdown.tick() {
                CountdownTick::Running(_) => (S::Created { order_id, countdown }, Vec::new()),
                CountdownTick::Expired => (
                    S::Cancelling {
                        order_id: order_id.clone(),
                        reason: CancelReason::Expired,
                    },
                    vec![Effect::CancelOrder(order_id)],
                ),
            },

            (S::Created { order_id, .. }, E::Approved(details)) if details.id == order_id => (
                S::Processing { order_id },
                vec![Effect::CaptureOrder(details)],
            ),

            (S::Created { order_id, .. }, E::CloseRequested)
            | (
                S::Failed {
                    order_id: Some(order_id),
                    ..
                },
                E::CloseRequested,
            ) => (
                S::Cancelling {
                    order_id: order_id.clone(),
                    reason: CancelReason::UserClosed,
                },
                vec![Effect::CancelOrder(order_id)],
            ),

            (S::Processing { .. }, E::Captured(confirmation)) => (
                S::Completed { confirmation },
                vec![Effect::ScheduleAutoClose(self.policy.success_close_delay)],
            ),

            (S::Processing { order_id }, E::CaptureFailed) => {
                Self::fail(FailedStep::Capture, CAPTURE_FAILED.to_string(), Some(order_id))
            }

            (S::Cancelling { .. }, E::CancelFinished(ok)) => {
                let notification = if ok {
                    Notification::info(PAYMENT_CANCELLED)
                } else {
                    Notification::error(CANCEL_FAILED)
                };
                (
                    S::initial(),
                    vec![Effect::Notify(notification), Effect::CloseModal],
                )
            }

            (S::Pending { creating: false }, E::CloseRequested)
            | (S::Failed { order_id: None, .. }, E::CloseRequested)
            | (S::Completed { .. }, E::CloseRequested)
            | (S::Completed { .. }, E::AutoCloseElapsed) => {
                (S::initial(), vec![Effect::CloseModal])
            }

            (state, event) => {
                debug!(
                    session_id = %self.id,
                    status = %state.status(),
                    event = ?event,
                    "Ignoring event in current state"
                );
                (state, Vec::new())
            }
        }
    }

    fn order_created(&self, order: CreatedOrder) -> (SessionState, Vec<Effect>) {
        let method = self.draft.payment_method;

        if !self.policy.requires_approval(method) {
            let confirmation = Confirmation {
                invoice_number: order.booking_id,
                amount: self.draft.total_price,
            };
            return (
                SessionState::Completed { confirmation },
                vec![Effect::ScheduleAutoClose(self.policy.success_close_delay)],
            );
        }

        // Without a hosted checkout the booking itself is what gets approved.
        let order_id = order
            .paypal_order_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| (!method.uses_hosted_checkout()).then_some(order.booking_id));

        match order_id {
            Some(order_id) => (
                SessionState::Created {
                    order_id,
                    countdown: Countdown::new(self.policy.approval_timeout, self.policy.tick),
                },
                Vec::new(),
            ),
            None => Self::fail(FailedStep::Create, CREATE_ORDER_FAILED.to_string(), None),
        }
    }

    fn fail(
        step: FailedStep,
        message: String,
        order_id: Option<String>,
    ) -> (SessionState, Vec<Effect>) {
        let notification = Notification::error(message.clone());
        (
            SessionState::Failed {
                failure: Failure { step, message },
                order_id,
            },
            vec![Effect::Notify(notification)],
        )
    }
}

/// Read-only view of a session, published to the UI on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub order_id: Option<String>,
    pub countdown: Option<Countdown>,
    pub confirmation: Option<Confirmation>,
    pub failure: Option<Failure>,
}

impl From<&PaymentSession> for SessionSnapshot {
    fn from(session: &PaymentSession) -> Self {
        let state = session.state();
        Self {
            session_id: session.id(),
            status: state.status(),
            order_id: state.order_id().map(str::to_string),
            countdown: state.countdown().copied(),
            confirmation: state.confirmation().cloned(),
            failure: state.failure().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motbook_sdk::objects::{DEFAULT_TOTAL_PRICE, PaymentMethod};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::date;

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

    fn created_order(paypal_order_id: Option<&str>) -> CreatedOrder {
        CreatedOrder {
            booking_id: "b-1".to_string(),
            paypal_order_id: paypal_order_id.map(str::to_string),
        }
    }

    fn opened_session(method: PaymentMethod) -> PaymentSession {
        let mut session = PaymentSession::new(draft(method), PaymentPolicy::default());
        assert_eq!(session.apply(SessionEvent::Open), vec![Effect::CreateOrder]);
        session
    }

    fn created_session() -> PaymentSession {
        let mut session = opened_session(PaymentMethod::PayPal);
        let effects = session.apply(SessionEvent::OrderCreated(created_order(Some("PO-1"))));
        assert!(effects.is_empty());
        assert_eq!(session.status(), SessionStatus::Created);
        session
    }

    fn cancel_count(effects: &[Effect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, Effect::CancelOrder(_)))
            .count()
    }

    #[test]
    fn test_creation_requested_once_per_lifecycle() {
        let mut session = opened_session(PaymentMethod::PayPal);
        // In flight: a second open must not create another order.
        assert!(session.apply(SessionEvent::Open).is_empty());

        session.apply(SessionEvent::OrderCreated(created_order(Some("PO-1"))));
        assert!(session.apply(SessionEvent::Open).is_empty());

        // Back to pending after cancellation, a new creation is allowed.
        session.apply(SessionEvent::CloseRequested);
        session.apply(SessionEvent::CancelFinished(true));
        assert_eq!(session.state(), &SessionState::initial());
        assert_eq!(session.apply(SessionEvent::Open), vec![Effect::CreateOrder]);
    }

    #[test]
    fn test_card_payment_happy_path() {
        let mut session = created_session();
        let countdown = session.state().countdown().copied().unwrap();
        assert_eq!(countdown.remaining(), Duration::from_secs(600));

        let details = ApprovalDetails::new("PO-1", DEFAULT_TOTAL_PRICE, "GBP");
        let effects = session.apply(SessionEvent::Approved(details.clone()));
        assert_eq!(effects, vec![Effect::CaptureOrder(details.clone())]);
        assert_eq!(session.status(), SessionStatus::Processing);

        let confirmation = details.confirmation().unwrap();
        let effects = session.apply(SessionEvent::Captured(confirmation));
        assert_eq!(
            effects,
            vec![Effect::ScheduleAutoClose(Duration::from_secs(10))]
        );

        let confirmation = session.state().confirmation().unwrap();
        assert_eq!(confirmation.invoice_number, "PO-1");
        assert_eq!(confirmation.amount, Decimal::from_str("43.20").unwrap());

        let effects = session.apply(SessionEvent::AutoCloseElapsed);
        assert_eq!(effects, vec![Effect::CloseModal]);
        assert_eq!(session.status(), SessionStatus::Pending);
    }

    #[test]
    fn test_countdown_expiry_cancels_exactly_once() {
        let mut session = created_session();
        let mut effects = Vec::new();
        for _ in 0..599 {
            effects.extend(session.apply(SessionEvent::Tick));
        }
        assert!(effects.is_empty());
        assert_eq!(session.status(), SessionStatus::Created);

        let effects = session.apply(SessionEvent::Tick);
        assert_eq!(effects, vec![Effect::CancelOrder("PO-1".to_string())]);
        assert!(matches!(
            session.state(),
            SessionState::Cancelling {
                reason: CancelReason::Expired,
                ..
            }
        ));

        // Late ticks while the cancellation is in flight are ignored.
        for _ in 0..5 {
            assert!(session.apply(SessionEvent::Tick).is_empty());
        }

        let effects = session.apply(SessionEvent::CancelFinished(true));
        assert_eq!(
            effects,
            vec![
                Effect::Notify(Notification::info(PAYMENT_CANCELLED)),
                Effect::CloseModal
            ]
        );
        assert_eq!(session.status(), SessionStatus::Pending);
    }

    #[test]
    fn test_ticks_ignored_outside_created() {
        let mut session = created_session();
        let details = ApprovalDetails::new("PO-1", DEFAULT_TOTAL_PRICE, "GBP");
        session.apply(SessionEvent::Approved(details.clone()));

        let before = session.state().clone();
        for _ in 0..700 {
            assert!(session.apply(SessionEvent::Tick).is_empty());
        }
        assert_eq!(session.state(), &before);

        session.apply(SessionEvent::Captured(details.confirmation().unwrap()));
        for _ in 0..700 {
            assert_eq!(cancel_count(&session.apply(SessionEvent::Tick)), 0);
        }
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn test_cash_completes_on_creation() {
        let mut session = opened_session(PaymentMethod::Cash);
        let effects = session.apply(SessionEvent::OrderCreated(created_order(None)));

        assert_eq!(
            effects,
            vec![Effect::ScheduleAutoClose(Duration::from_secs(10))]
        );
        let confirmation = session.state().confirmation().unwrap();
        assert_eq!(confirmation.invoice_number, "b-1");
        assert_eq!(confirmation.amount, DEFAULT_TOTAL_PRICE);
    }

    #[test]
    fn test_cash_follows_widget_flow_when_configured() {
        let policy = PaymentPolicy {
            cash_completes_on_creation: false,
            ..PaymentPolicy::default()
        };
        let mut session = PaymentSession::new(draft(PaymentMethod::Cash), policy);
        session.apply(SessionEvent::Open);
        session.apply(SessionEvent::OrderCreated(created_order(None)));

        assert_eq!(session.status(), SessionStatus::Created);
        assert_eq!(session.state().order_id(), Some("b-1"));
    }

    #[test]
    fn test_card_order_without_provider_id_fails() {
        let mut session = opened_session(PaymentMethod::PayPal);
        let effects = session.apply(SessionEvent::OrderCreated(created_order(None)));

        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::error(CREATE_ORDER_FAILED))]
        );
        assert_eq!(session.status(), SessionStatus::Error);
    }

    #[test]
    fn test_creation_failure_message() {
        let mut session = opened_session(PaymentMethod::PayPal);
        session.apply(SessionEvent::OrderCreationFailed(Some(
            "Slot no longer available".to_string(),
        )));
        let failure = session.state().failure().unwrap();
        assert_eq!(failure.step, FailedStep::Create);
        assert_eq!(failure.message, "Slot no longer available");

        let mut session = opened_session(PaymentMethod::PayPal);
        session.apply(SessionEvent::OrderCreationFailed(Some("  ".to_string())));
        assert_eq!(
            session.state().failure().unwrap().message,
            CREATE_ORDER_FAILED
        );

        // Nothing to cancel: dismissing just closes.
        assert_eq!(
            session.apply(SessionEvent::CloseRequested),
            vec![Effect::CloseModal]
        );
    }

    #[test]
    fn test_capture_failure_has_no_confirmation() {
        let mut session = created_session();
        let details = ApprovalDetails::new("PO-1", DEFAULT_TOTAL_PRICE, "GBP");
        session.apply(SessionEvent::Approved(details));

        let effects = session.apply(SessionEvent::CaptureFailed);
        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::error(CAPTURE_FAILED))]
        );
        assert_eq!(session.status(), SessionStatus::Error);
        assert!(session.state().confirmation().is_none());
        assert_eq!(
            session.state().failure().unwrap().step,
            FailedStep::Capture
        );

        // Dismissal cancels the order still held.
        let effects = session.apply(SessionEvent::CloseRequested);
        assert_eq!(effects, vec![Effect::CancelOrder("PO-1".to_string())]);
    }

    #[test]
    fn test_cancel_failure_still_closes() {
        let mut session = created_session();
        session.apply(SessionEvent::CloseRequested);
        let effects = session.apply(SessionEvent::CancelFinished(false));

        assert_eq!(
            effects,
            vec![
                Effect::Notify(Notification::error(CANCEL_FAILED)),
                Effect::CloseModal
            ]
        );
        assert_eq!(session.status(), SessionStatus::Pending);
    }

    #[test]
    fn test_approval_for_other_order_ignored() {
        let mut session = created_session();
        let details = ApprovalDetails::new("PO-OTHER", DEFAULT_TOTAL_PRICE, "GBP");
        assert!(session.apply(SessionEvent::Approved(details)).is_empty());
        assert_eq!(session.status(), SessionStatus::Created);
    }

    #[test]
    fn test_close_ignored_while_capturing() {
        let mut session = created_session();
        let details = ApprovalDetails::new("PO-1", DEFAULT_TOTAL_PRICE, "GBP");
        session.apply(SessionEvent::Approved(details));
        assert!(session.apply(SessionEvent::CloseRequested).is_empty());
        assert_eq!(session.status(), SessionStatus::Processing);
    }

    #[test]
    fn test_snapshot() {
        let session = created_session();
        let snapshot = SessionSnapshot::from(&session);
        assert_eq!(snapshot.session_id, session.id());
        assert_eq!(snapshot.status, SessionStatus::Created);
        assert_eq!(snapshot.order_id.as_deref(), Some("PO-1"));
        assert_eq!(
            snapshot.countdown.map(|c| c.format_remaining()).as_deref(),
            Some("10:00")
        );
    }
}
