//! Client-side logic of the MOT booking front end.
//!
//! Everything here is UI-agnostic: the payment session state machine and
//! its driver, the booking form, the admin session and viewers, and the
//! route table. Front ends feed events in and render what comes out.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

pub mod admin;
pub mod booking;
pub mod events;
pub mod payment;
pub mod routing;
