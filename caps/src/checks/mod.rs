//! Negotiation helpers for optional application features.

pub mod fp16;
pub mod gpu_validation;
