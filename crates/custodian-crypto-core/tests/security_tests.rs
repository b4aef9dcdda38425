#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Security validation suite for custodian-crypto-core.
//!
//! - Generated keys and nonces come from a working CSPRNG
//! - Sealed records never leak plaintext and reuse no nonce
//! - Tampering is reported before any plaintext is produced
//! - Secret-bearing types never print their contents

mod security;
