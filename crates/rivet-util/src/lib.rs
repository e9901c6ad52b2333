//! Shared utilities for rivet: hashing, downloads, archives, processes.

pub mod archive;
pub mod download;
pub mod error;
pub mod fs;
pub mod hash;
pub mod process;
