pub mod images;
pub mod notifications;
pub mod rental;
pub mod support;
