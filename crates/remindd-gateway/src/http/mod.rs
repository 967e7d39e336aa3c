pub mod health;
pub mod pages;
pub mod reminders;
pub mod schedule;
