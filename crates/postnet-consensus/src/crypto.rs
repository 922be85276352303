//! Hashing, keys and signatures.
//!
//! Every hash in the protocol is SHA-256 over the canonical bincode
//! encoding of the value. Bincode writes record fields in declared order
//! with fixed-width little-endian integers, so equal logical values always
//! produce equal bytes on every peer.

use crate::error::{ConsensusError, ConsensusResult};
use crate::KEY_BITS;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// A user's signing key. Miners never hold one.
pub type PrivateKey = RsaPrivateKey;

/// A SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Digest32(pub [u8; 32]);

impl Digest32 {
    /// The all-zero digest, used as the genesis predecessor link.
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl AsRef<[u8]> for Digest32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest32({})", hex::encode(self.0))
    }
}

/// Hash any serializable value.
///
/// A value that cannot be serialized is a programming error, not a runtime
/// condition, so this panics rather than returning a result.
pub fn hash<T: Serialize>(value: &T) -> Digest32 {
    let bytes = bincode::serialize(value).expect("chain types have a total bincode encoding");
    Digest32(Sha256::digest(&bytes).into())
}

/// Generate a fresh 2048-bit RSA key pair.
pub fn generate_key() -> PrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), KEY_BITS).expect("RSA key generation failed")
}

/// Sign a value with a private key (PKCS#1 v1.5 over the value's hash).
pub fn sign<T: Serialize>(key: &PrivateKey, value: &T) -> Vec<u8> {
    let digest = hash(value);
    key.sign(Pkcs1v15Sign::new::<Sha256>(), digest.as_ref())
        .expect("PKCS#1 v1.5 signing with a valid key failed")
}

/// A post author's public key.
///
/// The canonical byte form is the 4-byte little-endian public exponent
/// followed by the minimal big-endian modulus. Those bytes are what gets
/// hashed, compared and ordered everywhere in the protocol.
#[derive(Clone)]
pub struct AuthorKey {
    key: RsaPublicKey,
}

impl PartialEq for AuthorKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for AuthorKey {}

impl AuthorKey {
    /// Canonical byte representation: E (4 bytes LE) ++ N (big-endian).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut e = self.key.e().to_bytes_le();
        e.resize(4, 0);
        let n = self.key.n().to_bytes_be();
        let mut buf = Vec::with_capacity(4 + n.len());
        buf.extend_from_slice(&e);
        buf.extend_from_slice(&n);
        buf
    }

    /// Parse the canonical byte representation.
    pub fn from_bytes(bytes: &[u8]) -> ConsensusResult<Self> {
        if bytes.len() <= 4 {
            return Err(ConsensusError::MalformedKey);
        }
        let e = u32::from_le_bytes(bytes[..4].try_into().expect("length checked above"));
        let n = BigUint::from_bytes_be(&bytes[4..]);
        let key =
            RsaPublicKey::new(n, BigUint::from(e)).map_err(|_| ConsensusError::MalformedKey)?;
        Ok(Self { key })
    }

    /// Check a PKCS#1 v1.5 signature over a value against this key.
    pub fn verify<T: Serialize>(&self, value: &T, signature: &[u8]) -> bool {
        let digest = hash(value);
        self.key
            .verify(Pkcs1v15Sign::new::<Sha256>(), digest.as_ref(), signature)
            .is_ok()
    }
}

impl From<&PrivateKey> for AuthorKey {
    fn from(key: &PrivateKey) -> Self {
        Self {
            key: key.to_public_key(),
        }
    }
}

impl fmt::Debug for AuthorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "AuthorKey({}..)", hex::encode(&bytes[..8.min(bytes.len())]))
    }
}

impl Serialize for AuthorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for AuthorKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        AuthorKey::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}
