//! Customer-facing commands: availability and booking with payment.

use crate::commands::request::BookingRequest;
use crate::render;
use crate::shutdown::spawn_close_on_signal;
use crate::state::AppState;
use motbook_core::booking::{BookingForm, FormVariant, SubmitError, calendar};
use motbook_core::events::{
    DEFAULT_CHANNEL_BUFFER, ModalEvent, ModalEventSender, modal_event_channel,
};
use motbook_core::payment::{
    CancelReason, PaymentSessionController, SessionOutcome, SessionSnapshot,
};
use motbook_sdk::objects::{ApprovalDetails, BookingDraft, PaymentMethod, calendar_date};
use rust_decimal::Decimal;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use time::{Date, Month};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub fn new_form(state: &AppState, variant: FormVariant) -> BookingForm {
    BookingForm::new(
        variant,
        state.config.booking.clone(),
        Arc::new(state.booking.clone()),
        state.notifications.clone(),
        calendar::today(),
    )
}

/// Print the free slots of `date`.
pub async fn slots(state: &AppState, date: Date) -> anyhow::Result<()> {
    let mut form = new_form(state, FormVariant::Customer);
    form.change_month(date.year(), u8::from(date.month())).await;

    match form.select_date(date).await {
        Ok(slots) if slots.is_empty() => {}
        Ok(slots) => {
            println!("Available slots on {}:", calendar_date::format(date));
            for slot in slots {
                println!("  {slot}");
            }
        }
        Err(e) => println!("{e}"),
    }
    Ok(())
}

/// Print the bookable days of a month.
pub async fn calendar(state: &AppState, year: i32, month: Month) -> anyhow::Result<()> {
    let mut form = new_form(state, FormVariant::Customer);
    form.change_month(year, u8::from(month)).await;

    let days = calendar::selectable_days(year, month, calendar::today(), form.disabled_dates());
    if days.is_empty() {
        println!("No bookable days in {month} {year}");
        return Ok(());
    }
    println!("Bookable days in {month} {year}:");
    for day in days {
        println!("  {} ({})", calendar_date::format(day), day.weekday());
    }
    Ok(())
}

/// Fill `form` from the request file at `request_path`.
///
/// Returns `false` when the date or slot cannot be selected. The reason has
/// already been printed.
pub async fn fill_form(
    form: &mut BookingForm,
    request_path: &Path,
    method: Option<PaymentMethod>,
) -> anyhow::Result<bool> {
    let request = BookingRequest::from_file(request_path)?;
    request.apply_to(form.fields_mut(), method)?;

    form.change_month(request.date.year(), u8::from(request.date.month()))
        .await;
    if let Err(e) = form.select_date(request.date).await {
        println!("{e}");
        return Ok(false);
    }
    if let Err(e) = form.select_time_slot(&request.time_slot) {
        println!("{e}");
        if !form.available_slots().is_empty() {
            let offered: Vec<_> = form.available_slots().iter().map(|s| s.as_str()).collect();
            println!("Available slots: {}", offered.join(", "));
        }
        return Ok(false);
    }
    tracing::debug!(variant = ?form.variant(), path = %request_path.display(), "Form filled");
    Ok(true)
}

/// Book from a request file and run the payment session.
pub async fn book(
    state: &AppState,
    request_path: &Path,
    method: Option<PaymentMethod>,
) -> anyhow::Result<()> {
    let mut form = new_form(state, FormVariant::Customer);
    if !fill_form(&mut form, request_path, method).await? {
        return Ok(());
    }

    let draft = match form.submit_customer(&state.booking).await {
        Ok(draft) => draft,
        Err(SubmitError::Invalid(errors)) => {
            render::print_validation_errors(&errors);
            return Ok(());
        }
        // Already reported as a notification.
        Err(SubmitError::Rejected(_)) => return Ok(()),
    };

    pay(state, draft).await
}

/// Open a payment session for `draft` with the terminal as the payment widget.
async fn pay(state: &AppState, draft: BookingDraft) -> anyhow::Result<()> {
    let amount = draft.total_price;
    let (modal_tx, modal_rx) = modal_event_channel();
    let controller = PaymentSessionController::new(
        draft,
        state.config.payment.clone(),
        Arc::new(state.booking.clone()),
        state.notifications.clone(),
    );
    let snapshots = controller.subscribe();

    let renderer = spawn_snapshot_renderer(snapshots.clone());
    let widget = spawn_terminal_widget(
        modal_tx.clone(),
        snapshots,
        amount,
        state.config.payment.currency.clone(),
    );
    let signals = spawn_close_on_signal(modal_tx);

    let outcome = controller.run(modal_rx).await;

    widget.abort();
    signals.abort();
    if let Err(e) = renderer.await {
        tracing::warn!(error = %e, "Snapshot renderer stopped unexpectedly");
    }

    match outcome {
        SessionOutcome::Completed(confirmation) => {
            println!("Booking confirmed: {confirmation}");
        }
        SessionOutcome::Cancelled(CancelReason::Expired) => {
            println!("Booking not completed: the payment window expired");
        }
        SessionOutcome::Cancelled(CancelReason::UserClosed) => {
            println!("Booking not completed: payment cancelled");
        }
        SessionOutcome::Dismissed => println!("Booking not completed"),
    }
    Ok(())
}

/// Render every snapshot until the controller is gone.
fn spawn_snapshot_renderer(mut snapshots: watch::Receiver<SessionSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut previous: Option<SessionSnapshot> = None;
        loop {
            let current = snapshots.borrow_and_update().clone();
            if previous.as_ref() != Some(&current) {
                render::print_snapshot(previous.as_ref(), &current);
                previous = Some(current);
            }
            if snapshots.changed().await.is_err() {
                break;
            }
        }
    })
}

/// A typed command of the terminal payment widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidgetCommand {
    Approve,
    Cancel,
    Close,
}

impl WidgetCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "approve" | "a" | "pay" => Some(Self::Approve),
            "cancel" | "c" => Some(Self::Cancel),
            "close" | "q" | "quit" => Some(Self::Close),
            _ => None,
        }
    }
}

/// Forward stdin lines from a detached thread, so a pending read never
/// blocks runtime shutdown.
fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read from stdin");
                    break;
                }
            };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Read widget commands from stdin and turn them into modal events.
///
/// Approval carries the order currently awaiting approval, as the hosted
/// checkout would. End of input stops reading without closing the modal.
fn spawn_terminal_widget(
    modal_tx: ModalEventSender,
    snapshots: watch::Receiver<SessionSnapshot>,
    amount: Decimal,
    currency: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = stdin_lines();
        while let Some(line) = lines.recv().await {
            if line.trim().is_empty() {
                continue;
            }

            let event = match WidgetCommand::parse(&line) {
                Some(WidgetCommand::Approve) => {
                    let order_id = snapshots.borrow().order_id.clone();
                    match order_id {
                        Some(order_id) => ModalEvent::Approved(ApprovalDetails::new(
                            order_id,
                            amount,
                            currency.clone(),
                        )),
                        None => {
                            println!("No order is awaiting approval");
                            continue;
                        }
                    }
                }
                Some(WidgetCommand::Cancel) => ModalEvent::Cancelled,
                Some(WidgetCommand::Close) => ModalEvent::Close,
                None => {
                    println!(
                        "Unknown command {:?}. Type `approve`, `cancel` or `close`.",
                        line.trim()
                    );
                    continue;
                }
            };
            if modal_tx.send(event).await.is_err() {
                break;
            }
        }
    })
}
