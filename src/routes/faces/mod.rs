mod handler;
mod model;

pub use handler::{recognize_face, register_face};
