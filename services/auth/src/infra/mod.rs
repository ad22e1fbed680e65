pub mod cache;
pub mod clock;
pub mod memory;
pub mod notifier;
pub mod store;
