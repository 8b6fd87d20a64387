//! # blvm-script-core
//!
//! secp256k1 arithmetic, ECDSA, and the Bitcoin Script interpreter that sits
//! between a transaction and its outputs.
//!
//! ## Layers
//!
//! - [`ecc`]: prime-field elements and elliptic-curve points, with the
//!   secp256k1 parameters as process-wide constants
//! - [`serialization`]: SEC public keys, DER signatures and VarInts
//! - [`ecdsa`]: private keys, signing (random or RFC 6979 nonces) and verification
//! - [`script`]: parsing, serialization and stack-machine evaluation, including P2SH
//!
//! The transaction layer is an external collaborator: it supplies raw script
//! bytes and the signature hash `z`, and receives a verdict.
//!
//! ## Usage
//!
//! ```rust
//! use blvm_script_core::ecdsa::PrivateKey;
//! use blvm_script_core::crypto::hash160;
//! use blvm_script_core::script::{Command, Script};
//! use num_bigint::BigUint;
//!
//! let key = PrivateKey::new(BigUint::from(8675309u32)).unwrap();
//! let z = BigUint::from(0xdeadbeefu32);
//!
//! let sec = key.sec(true).unwrap();
//! let mut sig = key.sign(&z).unwrap().der();
//! sig.push(0x01); // SIGHASH_ALL
//!
//! let unlocking = Script::new(vec![Command::Push(sig), Command::Push(sec.clone())]);
//! let locking = Script::p2pkh(&hash160(&sec));
//! assert!(unlocking.combine(&locking).evaluate(&z).unwrap());
//! ```

pub mod config;
pub mod constants;
pub mod crypto;
pub mod ecc;
pub mod ecdsa;
pub mod error;
pub mod opcodes;
pub mod script;
pub mod serialization;
pub mod types;

pub use ecc::{FieldElement, Point};
pub use ecdsa::{PrivateKey, Signature};
pub use error::{ConsensusError, Result, ScriptErrorCode};
pub use script::{verify_batch, verify_script, Command, Script};

use num_bigint::BigUint;

/// Script core - wrapper struct for the verification entry points
///
/// Methods delegate to the corresponding module functions; the struct holds
/// no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptCore;

impl ScriptCore {
    /// Create a new ScriptCore instance
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a length-prefixed unlocking/locking script pair against `z`
    pub fn verify_script(&self, script_sig: &[u8], script_pubkey: &[u8], z: &BigUint) -> Result<bool> {
        script::verify_script(script_sig, script_pubkey, z)
    }

    /// Verify a DER signature (no sighash byte) against a SEC public key
    pub fn verify_signature(&self, sec: &[u8], der: &[u8], z: &BigUint) -> Result<bool> {
        let point = Point::parse_sec(sec)?;
        let sig = Signature::parse_der(der)?;
        Ok(ecdsa::verify(&point, &sig, z))
    }

    /// Evaluate independent scripts, in parallel with the `rayon` feature
    pub fn verify_batch(&self, jobs: &[(Script, BigUint)]) -> Vec<Result<bool>> {
        script::verify_batch(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::{OP_1, OP_EQUAL};

    #[test]
    fn test_script_core_verify_signature() {
        let core = ScriptCore::new();
        let key = PrivateKey::new(BigUint::from(2024u32)).unwrap();
        let z = BigUint::from(7u8);
        let sig = key
            .sign_with(&z, config::NoncePolicy::Deterministic)
            .unwrap()
            .der();
        let sec = key.sec(true).unwrap();
        assert!(core.verify_signature(&sec, &sig, &z).unwrap());
        assert!(!core.verify_signature(&sec, &sig, &BigUint::from(8u8)).unwrap());
        assert!(core.verify_signature(&sec[..10], &sig, &z).is_err());
    }

    #[test]
    fn test_script_core_verify_script() {
        let core = ScriptCore::new();
        assert!(core
            .verify_script(&[0x01, OP_1], &[0x02, OP_1, OP_EQUAL], &BigUint::from(0u8))
            .unwrap());
        let results = core.verify_batch(&[(Script::new(vec![Command::Op(OP_1)]), BigUint::from(0u8))]);
        assert_eq!(results, vec![Ok(true)]);
    }
}
