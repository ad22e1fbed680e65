pub mod challenge;
pub mod sweep;
