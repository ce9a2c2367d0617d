mod handler;
mod model;

pub use handler::send_email;
pub use model::SendEmailRequest;
