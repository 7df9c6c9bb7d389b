//! Integration test crate for CurveKit.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It drives `curvekit-edit` commands against `curvekit-core` curves.

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod commands;

#[cfg(test)]
mod batching;

#[cfg(test)]
mod properties;
