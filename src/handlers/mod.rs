pub mod admin;
pub mod auth;
pub mod catalog;
pub mod inbox;
pub mod profile;
pub mod rentals;
pub mod support;
