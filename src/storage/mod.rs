//! Storage Module
//!
//! Two independent maps, each behind its own reader/writer lock:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                StorageEngine                 │
//! │  ┌────────────────────┐  ┌────────────────┐  │
//! │  │ key space          │  │ ConfigStore    │  │
//! │  │ RwLock<HashMap>    │  │ RwLock<BTree>  │  │
//! │  │ SET / GET / DEL    │  │ CONFIG GET/SET │  │
//! │  └────────────────────┘  └────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Nothing is persisted; both maps live as long as the process.

pub mod config;
pub mod engine;

pub use config::ConfigStore;
pub use engine::StorageEngine;
