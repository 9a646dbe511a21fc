//! Node REST client and local-key wallet for Move (Aptos-compatible) networks.

pub mod client;
pub mod models;
pub mod wallet;

pub use client::{RestClient, RestClientConfig};
pub use wallet::{
    derive_address, generate_signing_key, signing_key_from_hex, LocalWallet, TransactionOptions,
    WatchOnlyWallet,
};
