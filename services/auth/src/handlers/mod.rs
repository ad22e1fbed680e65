pub mod challenge;
pub mod health;
