//! Process-level tests for `ctxlog`.
//!
//! The default logging system is process-wide state, so the tests that
//! reconfigure it live in their own crate and test binary, away from the
//! library's unit tests.
