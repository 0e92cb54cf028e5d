//! Data models for the ClubHub club-management platform.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod approval;
mod club;
mod event;
mod reward;
mod user;

pub use approval::*;
pub use club::*;
pub use event::*;
pub use reward::*;
pub use user::*;
