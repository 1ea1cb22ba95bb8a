//! Booking-payment session.
//!
//! `state` holds the pure state machine, `controller` the async driver that
//! executes its effects, and `gateway` the network seam between them and
//! the backend.

pub mod controller;
pub mod countdown;
pub mod gateway;
pub mod state;

pub use controller::{PaymentSessionController, SessionOutcome};
pub use countdown::{Countdown, CountdownTick};
pub use gateway::{GatewayError, PaymentGateway};
pub use state::{
    CancelReason, Effect, FailedStep, Failure, PaymentSession, SessionEvent, SessionSnapshot,
    SessionState, SessionStatus,
};
