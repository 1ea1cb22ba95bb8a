//! Customer and admin booking forms.

pub mod backend;
pub mod calendar;
pub mod form;
pub mod validation;

pub use backend::{AdminBookingSink, AvailabilitySource, CustomerCheck};
pub use form::{BookingForm, FormError, SubmitError};
pub use validation::{Field, FieldError, FormFields, FormVariant, ValidationErrors};
