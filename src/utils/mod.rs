pub mod jwt;
pub mod validation;
pub mod time;
