pub mod access;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, INVALID_LOGIN};
pub use auth_service_impl::SeaOrmAuthService;

pub mod notes_service;
pub mod notes_service_impl;
pub use notes_service::{NotesError, NotesService};
pub use notes_service_impl::SeaOrmNotesService;
