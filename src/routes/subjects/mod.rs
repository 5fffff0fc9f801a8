mod handler;
mod model;

pub use handler::{create_subject, get_subject, list_subjects, update_subject};
pub use model::Subject;
