//! Admin shell: session, customer viewer and photo gallery.

pub mod customer;
pub mod gallery;
pub mod session;

pub use customer::{CustomerDirectory, CustomerView, CustomerViewer, booking_label};
pub use gallery::{GalleryError, PhotoGallery};
pub use session::{AdminAuth, AuthState, CredentialStore, SessionContext, SessionError};
