pub mod detection;
pub mod health;
pub mod input;
pub mod roster;
pub mod scoreboard;
pub mod sse;
pub mod validation;
