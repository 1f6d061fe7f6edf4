//! Protobuf wire types for hub messages.
//!
//! Hand-derived subset of the hub message schema — only the fields this bot
//! reads or writes. Field tags and enum values must match the live protocol
//! exactly; they are load-bearing, not documentation.

/// Reference to an existing cast, used as a reply parent.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CastId {
    #[prost(uint64, tag = "1")]
    pub fid: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: ::prost::alloc::vec::Vec<u8>,
}

/// Body of a new cast.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CastAddBody {
    /// Fids mentioned in the cast text.
    #[prost(uint64, repeated, tag = "2")]
    pub mentions: ::prost::alloc::vec::Vec<u64>,
    #[prost(string, tag = "4")]
    pub text: ::prost::alloc::string::String,
    /// Byte positions of the mentions within the text.
    #[prost(uint32, repeated, tag = "5")]
    pub mentions_positions: ::prost::alloc::vec::Vec<u32>,
    #[prost(oneof = "cast_add_body::Parent", tags = "3, 7")]
    pub parent: ::core::option::Option<cast_add_body::Parent>,
}

pub mod cast_add_body {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Parent {
        #[prost(message, tag = "3")]
        ParentCastId(super::CastId),
        #[prost(string, tag = "7")]
        ParentUrl(::prost::alloc::string::String),
    }
}

/// The signed payload of a message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageData {
    #[prost(enumeration = "MessageType", tag = "1")]
    pub r#type: i32,
    #[prost(uint64, tag = "2")]
    pub fid: u64,
    /// Seconds since the Farcaster epoch, not unix time.
    #[prost(uint32, tag = "3")]
    pub timestamp: u32,
    #[prost(enumeration = "FarcasterNetwork", tag = "4")]
    pub network: i32,
    #[prost(oneof = "message_data::Body", tags = "5")]
    pub body: ::core::option::Option<message_data::Body>,
}

pub mod message_data {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Body {
        #[prost(message, tag = "5")]
        CastAddBody(super::CastAddBody),
    }
}

/// Envelope submitted to the hub: payload plus hash and signature metadata.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(message, optional, tag = "1")]
    pub data: ::core::option::Option<MessageData>,
    /// First 20 bytes of the blake3 hash of `data_bytes`.
    #[prost(bytes = "vec", tag = "2")]
    pub hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(enumeration = "HashScheme", tag = "3")]
    pub hash_scheme: i32,
    #[prost(bytes = "vec", tag = "4")]
    pub signature: ::prost::alloc::vec::Vec<u8>,
    #[prost(enumeration = "SignatureScheme", tag = "5")]
    pub signature_scheme: i32,
    /// Public key of the signing keypair.
    #[prost(bytes = "vec", tag = "6")]
    pub signer: ::prost::alloc::vec::Vec<u8>,
    /// Serialized `MessageData`; hubs hash and verify these exact bytes.
    #[prost(bytes = "vec", optional, tag = "7")]
    pub data_bytes: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    None = 0,
    CastAdd = 1,
    CastRemove = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FarcasterNetwork {
    None = 0,
    Mainnet = 1,
    Testnet = 2,
    Devnet = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum HashScheme {
    None = 0,
    Blake3 = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SignatureScheme {
    None = 0,
    Ed25519 = 1,
    Eip712 = 2,
}
