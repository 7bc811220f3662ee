pub mod calendar;
pub mod goal;
pub mod notifications;
pub mod service;
pub mod streak;

pub use crate::service::{StreakService, StreakServiceBuilder};
