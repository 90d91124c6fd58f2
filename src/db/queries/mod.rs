pub mod files;
pub mod quizes;
pub mod users;
