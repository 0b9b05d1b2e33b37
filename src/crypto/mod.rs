//! Cryptographic primitives for response verification.

pub mod canonical;
pub mod envelope;
pub mod header;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;
