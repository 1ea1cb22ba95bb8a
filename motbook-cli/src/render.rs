//! Terminal rendering of notifications, form errors and session state.

use motbook_core::booking::ValidationErrors;
use motbook_core::events::NotificationReceiver;
use motbook_core::payment::{Countdown, SessionSnapshot, SessionStatus};
use std::time::Duration;
use tokio::task::JoinHandle;

const PROGRESS_WIDTH: usize = 20;

/// Remaining share of the countdown as `[#####-----]`, `width` cells wide.
pub fn progress_bar(countdown: &Countdown, width: usize) -> String {
    let filled = (countdown.fraction_remaining() * width as f64).ceil() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Print every notification until all senders are dropped.
pub fn spawn_notification_printer(mut rx: NotificationReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            println!("{notification}");
        }
    })
}

pub fn print_validation_errors(errors: &ValidationErrors) {
    for error in errors.iter() {
        println!("  {}: {}", error.field.name(), error.message);
    }
}

/// Render a session snapshot, given the previously rendered one.
///
/// Status changes are always printed. While awaiting approval the countdown
/// is printed on every full minute and during the last ten seconds.
pub fn print_snapshot(previous: Option<&SessionSnapshot>, snapshot: &SessionSnapshot) {
    let status_changed = previous.is_none_or(|p| p.status != snapshot.status);

    match snapshot.status {
        SessionStatus::Pending if status_changed => {
            println!("Payment session closed.");
        }
        SessionStatus::Created => {
            let order_id = snapshot.order_id.as_deref().unwrap_or("-");
            let Some(countdown) = snapshot.countdown else {
                return;
            };
            if status_changed {
                println!(
                    "Order {order_id} created. Approve within {}.",
                    countdown.format_remaining()
                );
                println!("Type `approve`, `cancel` or `close`.");
            } else {
                let remaining = countdown.remaining();
                if remaining.as_secs() % 60 == 0 || remaining <= Duration::from_secs(10) {
                    println!(
                        "{} {} remaining",
                        progress_bar(&countdown, PROGRESS_WIDTH),
                        countdown.format_remaining()
                    );
                }
            }
        }
        SessionStatus::Processing if status_changed => {
            println!("Processing payment...");
        }
        SessionStatus::Completed if status_changed => {
            if let Some(confirmation) = &snapshot.confirmation {
                println!("Payment complete: {confirmation}");
            }
        }
        SessionStatus::Error if status_changed => {
            if let Some(failure) = &snapshot.failure {
                println!("Payment failed: {}", failure.message);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        let mut countdown = Countdown::new(Duration::from_secs(600), Duration::from_secs(1));
        assert_eq!(progress_bar(&countdown, 10), "[##########]");

        for _ in 0..300 {
            countdown.tick();
        }
        assert_eq!(progress_bar(&countdown, 10), "[#####-----]");

        for _ in 0..300 {
            countdown.tick();
        }
        assert_eq!(progress_bar(&countdown, 10), "[----------]");
    }
}
