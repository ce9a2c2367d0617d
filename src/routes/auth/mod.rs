mod handler;
mod model;

pub use handler::login;
pub use model::{LoginRequest, LoginResponse};
