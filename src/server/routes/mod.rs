mod auth;
mod files;
mod profile;
mod quiz;

pub use auth::auth_router;
pub use files::files_router;
pub use profile::profile_router;
pub use quiz::quiz_router;
