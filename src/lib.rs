//! Shopfront - Multi-tenant storefront core.
//!
//! This crate implements the transactional heart of a multi-tenant
//! storefront: store ownership and access levels, the order delivery
//! lifecycle with its sales-ledger side effects, and purchase-gated
//! reviews. HTTP routing, background job scheduling, and credential
//! handling live outside this crate and talk to it through the port
//! traits in [`ports`].

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
