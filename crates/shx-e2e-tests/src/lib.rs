//! Integration-test crate for the shx pipeline.
//!
//! All coverage lives in `tests/`; this library target is intentionally
//! empty.
