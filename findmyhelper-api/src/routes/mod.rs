/// Route handlers
pub mod admin;
pub mod auth;
pub mod categories;
pub mod health;
pub mod providers;
pub mod reviews;
pub mod service_requests;
pub mod tasks;
pub mod uploads;
pub mod users;
