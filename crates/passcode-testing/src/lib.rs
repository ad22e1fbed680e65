//! Test utilities for Passcode services.
//!
//! Provides a controllable clock, recording and failing notifiers, and
//! `TestApp`, an in-process HTTP harness around the auth router.
//! Import from tests only, never from production code.

pub mod app;
pub mod clock;
pub mod notifier;
