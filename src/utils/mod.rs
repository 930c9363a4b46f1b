pub mod jwt;
pub mod password;
pub mod time;
pub mod validation;
