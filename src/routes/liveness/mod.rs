mod handler;
mod model;

pub use handler::verify_liveness;
