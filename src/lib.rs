// Library crate root.
//
// This crate is used both as a binary (src/main.rs) and as a library.
// Keeping modules here prevents "dead_code" warnings for public APIs that are
// intentionally exported for downstream crates.

pub mod error;
pub mod mat3;
pub mod im;
pub mod compose;
pub mod resample;
pub mod config;
pub mod session;
pub mod viewer;

#[cfg(test)]
pub mod test_helpers;
