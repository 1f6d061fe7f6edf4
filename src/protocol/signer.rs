//! Reply construction and signing.
//!
//! Turns a plaintext reply into the binary hub message: protobuf-encode the
//! payload, hash it with blake3 truncated to 20 bytes, sign the hash with
//! the bot's ed25519 key. Hash function, truncation length and signature
//! scheme are wire-compatibility requirements of the hub verifier.

use ed25519_dalek::{Signer as _, SigningKey};
use prost::Message as _;

use crate::error::ProtocolError;
use crate::protocol::wire::{
    CastAddBody, CastId, FarcasterNetwork, HashScheme, MessageData, MessageType, SignatureScheme,
    cast_add_body, message_data,
};
use crate::protocol::{now_feed_time, wire};

/// Truncated hash length the hub verifier expects.
pub const MESSAGE_HASH_LEN: usize = 20;

/// Length of the ed25519 signing seed.
pub const SEED_LEN: usize = 32;

/// Signs replies on behalf of the bot identity.
///
/// The keypair is derived deterministically from the seed at construction
/// and lives only in memory.
pub struct Signer {
    fid: u64,
    key: SigningKey,
}

impl Signer {
    /// Derive the signing keypair from a 32-byte seed.
    pub fn new(fid: u64, seed: &[u8]) -> Result<Self, ProtocolError> {
        let seed: [u8; SEED_LEN] = seed.try_into().map_err(|_| ProtocolError::SeedLength {
            expected: SEED_LEN,
            actual: seed.len(),
        })?;
        Ok(Self {
            fid,
            key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn fid(&self) -> u64 {
        self.fid
    }

    /// Public half of the signing keypair.
    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Sign a reply to the cast `target_hash` by `target_fid`, timestamped
    /// with the current wall clock.
    pub fn sign_reply(&self, target_fid: u64, target_hash: &[u8], text: &str) -> SignedReply {
        self.sign_reply_at(target_fid, target_hash, text, now_feed_time() as u32)
    }

    /// Sign a reply with an explicit feed timestamp.
    ///
    /// Same inputs always produce the same bytes: protobuf encoding is
    /// deterministic and ed25519 signatures carry no randomness.
    pub fn sign_reply_at(
        &self,
        target_fid: u64,
        target_hash: &[u8],
        text: &str,
        timestamp: u32,
    ) -> SignedReply {
        let body = CastAddBody {
            text: text.to_string(),
            parent: Some(cast_add_body::Parent::ParentCastId(CastId {
                fid: target_fid,
                hash: target_hash.to_vec(),
            })),
            ..Default::default()
        };
        let data = MessageData {
            r#type: MessageType::CastAdd as i32,
            fid: self.fid,
            timestamp,
            network: FarcasterNetwork::Mainnet as i32,
            body: Some(message_data::Body::CastAddBody(body)),
        };
        let data_bytes = data.encode_to_vec();

        let digest = blake3::hash(&data_bytes);
        let mut message_hash = [0u8; MESSAGE_HASH_LEN];
        message_hash.copy_from_slice(&digest.as_bytes()[..MESSAGE_HASH_LEN]);

        // The hub verifier checks the signature against the truncated hash,
        // not the full payload bytes.
        let signature = self.key.sign(&message_hash).to_bytes().to_vec();

        SignedReply {
            hash_scheme: HashScheme::Blake3,
            signature_scheme: SignatureScheme::Ed25519,
            message_hash,
            signature,
            signer: self.public_key().to_vec(),
            data,
            data_bytes,
        }
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("Signer").field("fid", &self.fid).finish()
    }
}

/// A fully signed reply, ready for submission. Built once per reply and
/// never mutated.
#[derive(Debug, Clone)]
pub struct SignedReply {
    pub hash_scheme: HashScheme,
    pub signature_scheme: SignatureScheme,
    /// blake3(data_bytes) truncated to 20 bytes.
    pub message_hash: [u8; MESSAGE_HASH_LEN],
    pub signature: Vec<u8>,
    /// Public key of the signing keypair.
    pub signer: Vec<u8>,
    /// The exact payload bytes the hash covers.
    pub data_bytes: Vec<u8>,
    data: MessageData,
}

impl SignedReply {
    /// Encode the outer envelope for `submitMessage`.
    pub fn encode(&self) -> Vec<u8> {
        wire::Message {
            data: Some(self.data.clone()),
            hash: self.message_hash.to_vec(),
            hash_scheme: self.hash_scheme as i32,
            signature: self.signature.clone(),
            signature_scheme: self.signature_scheme as i32,
            signer: self.signer.clone(),
            data_bytes: Some(self.data_bytes.clone()),
        }
        .encode_to_vec()
    }
}
