//! Core trait abstractions.

pub mod transport;
