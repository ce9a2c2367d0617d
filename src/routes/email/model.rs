use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SendEmailRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(length(min = 5))]
    pub phone: String,
    #[validate(length(min = 5, max = 500))]
    pub text: String,
}
