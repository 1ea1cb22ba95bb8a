//! Admin commands: session, customer lookup, photos and staff bookings.

use crate::commands::booking::{fill_form, new_form};
use crate::render;
use crate::state::AppState;
use motbook_core::admin::customer::detail_rows;
use motbook_core::admin::{CustomerView, CustomerViewer, PhotoGallery, SessionContext, SessionError};
use motbook_core::booking::{FormVariant, SubmitError};
use motbook_core::routing::{self, Resolution, Route};
use motbook_sdk::objects::PaymentMethod;
use std::path::Path;

/// Restore the stored session and check it may open `route`.
///
/// Returns `None` after printing why when the route would redirect.
async fn open_protected(state: &AppState, route: &Route) -> anyhow::Result<Option<SessionContext>> {
    let mut session = state.session_context();
    session.init().await?;

    match routing::resolve(&route.path(), &session) {
        Resolution::Render(_) => Ok(Some(session)),
        Resolution::Redirect(Route::Login) => {
            println!("Not logged in. Run `motbook admin login` first.");
            Ok(None)
        }
        Resolution::Redirect(other) => {
            tracing::debug!(%route, redirect = %other, "Unexpected redirect");
            Ok(None)
        }
    }
}

pub async fn login(state: &AppState, email: &str, password: &str) -> anyhow::Result<()> {
    let mut session = state.session_context();
    session.init().await?;
    if let Some(profile) = session.profile() {
        println!("Already logged in as {}", profile.email);
        return Ok(());
    }

    match session.login(email, password).await {
        Ok(profile) => println!("Logged in as {}", profile.email),
        Err(SessionError::LoginFailed(message)) => println!("{message}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn logout(state: &AppState) -> anyhow::Result<()> {
    let mut session = state.session_context();
    session.init().await?;
    let was_authenticated = session.is_authenticated();
    session.logout().await?;

    if was_authenticated {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub async fn whoami(state: &AppState) -> anyhow::Result<()> {
    let Some(session) = open_protected(state, &Route::AdminProfile).await? else {
        return Ok(());
    };
    if let Some(profile) = session.profile() {
        match &profile.name {
            Some(name) => println!("{name} <{}>", profile.email),
            None => println!("{}", profile.email),
        }
    }
    Ok(())
}

/// Show a customer booking, optionally downloading its photos into
/// `photos_dir`.
pub async fn customer(
    state: &AppState,
    customer_id: &str,
    photos_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let Some(session) = open_protected(state, &Route::AdminDashboard).await? else {
        return Ok(());
    };
    let client = state.authorized_admin(&session);

    let mut viewer = CustomerViewer::new();
    match viewer.open(&client, customer_id).await {
        CustomerView::Empty => {
            println!("No customer id given");
            return Ok(());
        }
        CustomerView::Failed(message) => {
            println!("{message}");
            return Ok(());
        }
        CustomerView::Loaded(record) => {
            let rows = detail_rows(record);
            let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
            for (label, value) in rows {
                println!("{label:<width$}  {value}");
            }
        }
    }

    let (Some(dir), Some(record)) = (photos_dir, viewer.customer()) else {
        return Ok(());
    };
    let mut gallery = PhotoGallery::new(record.photos.clone());
    if gallery.is_empty() {
        println!("No photos to download");
        return Ok(());
    }

    let http = reqwest::Client::builder()
        .timeout(state.config.api.request_timeout)
        .build()?;
    for _ in 0..gallery.len() {
        let counter = gallery.counter().unwrap_or_default();
        match gallery.download_current(&http, dir).await {
            Ok(path) => println!("[{counter}] saved {}", path.display()),
            Err(e) => println!("[{counter}] download failed: {e}"),
        }
        gallery.next();
    }
    Ok(())
}

/// Create a booking on behalf of a customer.
pub async fn book(
    state: &AppState,
    request_path: &Path,
    method: Option<PaymentMethod>,
) -> anyhow::Result<()> {
    let Some(session) = open_protected(state, &Route::AdminCustomerBooking).await? else {
        return Ok(());
    };
    let client = state.authorized_admin(&session);

    let mut form = new_form(state, FormVariant::Admin);
    if !fill_form(&mut form, request_path, method).await? {
        return Ok(());
    }

    match form.submit_admin(&client).await {
        Ok(next) => tracing::debug!(route = %next, "Admin booking submitted"),
        Err(SubmitError::Invalid(errors)) => render::print_validation_errors(&errors),
        // Already reported as a notification.
        Err(SubmitError::Rejected(_)) => {}
    }
    Ok(())
}

/// Print what navigating to `path` does with the stored session.
pub async fn route(state: &AppState, path: &str) -> anyhow::Result<()> {
    let mut session = state.session_context();
    session.init().await?;

    match routing::resolve(path, &session) {
        Resolution::Render(route) => println!("render {route}"),
        Resolution::Redirect(route) => println!("redirect {route}"),
    }
    Ok(())
}
