pub mod booking;
pub mod catalog;
pub mod payment;
pub mod pricing;
pub mod users;
