pub mod booking;
pub mod notification;
pub mod profile;
pub mod revoked_token;
pub mod vehicle;
