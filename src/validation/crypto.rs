use ethers::types::{Address, Signature};
use std::sync::Arc;
use tracing::trace;

/// Signature verification capability consumed by the validator.
///
/// Implementations must be pure: the same arguments always give the same
/// answer. There is no error channel, malformed input simply does not verify.
pub trait SignatureVerifier {
    fn verify(&self, owner: &Address, message: &[u8], signature: &[u8]) -> bool;
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, owner: &Address, message: &[u8], signature: &[u8]) -> bool {
        (**self).verify(owner, message, signature)
    }
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for Arc<V> {
    fn verify(&self, owner: &Address, message: &[u8], signature: &[u8]) -> bool {
        (**self).verify(owner, message, signature)
    }
}

/// secp256k1 ECDSA verification of 65-byte `r || s || v` signatures.
///
/// The message is hashed the EIP-191 way (`"\x19Ethereum Signed Message:\n" || len || message`),
/// the signer is recovered and compared against the owner address.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl SignatureVerifier for EcdsaVerifier {
    fn verify(&self, owner: &Address, message: &[u8], signature: &[u8]) -> bool {
        let signature = match Signature::try_from(signature) {
            Ok(signature) => signature,
            Err(e) => {
                trace!("Malformed signature: {}", e);
                return false;
            }
        };
        match signature.verify(message, *owner) {
            Ok(()) => true,
            Err(e) => {
                trace!("Signature rejected for {:?}: {}", owner, e);
                false
            }
        }
    }
}
