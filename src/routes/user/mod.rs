mod handler;
mod model;

pub use handler::{create_user, get_all_users, remove_user_by_id};
pub use model::CreateUserRequest;
