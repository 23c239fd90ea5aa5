//! Filesystem utilities for bazel-clippy.

pub mod atomic;

pub use atomic::atomic_write;
