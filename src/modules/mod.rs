pub mod auth;
pub mod classes;
pub mod contacts;
pub mod health;
pub mod students;
pub mod users;
