pub mod json;
pub mod password;

pub use json::{double_option, JsonBody};
pub use password::{hash_password, verify_password, Password};
