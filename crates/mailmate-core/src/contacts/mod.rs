//! Address book mapping display names to mail addresses.

mod model;
mod repository;

pub use model::Contact;
pub use repository::ContactDirectory;
