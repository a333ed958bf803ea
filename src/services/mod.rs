pub mod auth;
pub mod calculator;
pub mod permissions;
pub mod timeclock;

pub use auth::AuthService;
pub use timeclock::TimeClockService;
