//! # tally-store: Record Store for Tally POS
//!
//! This crate owns the persisted record collections and publishes a live
//! view of each one.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                               │
//! │                                                                         │
//! │  Register engine (open_register, record_sale, ...)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  RecordStore  │    │  MemoryStore  │    │ Subscription │  │   │
//! │  │   │   (trait)     │    │  (impl)       │    │  (helper)    │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ append/delete │◄───│ Vec + RwLock  │    │ watch → cb   │  │   │
//! │  │   │ watch_*       │    │ watch senders │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  watch::Receiver<Arc<[T]>> per collection                              │
//! │  (every mutation republishes the complete collection)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Live Views
//! Readers hold a `watch::Receiver` per collection. After any mutation the
//! store publishes the full collection again; a reader that falls behind
//! skips straight to the newest snapshot. Readers never see a partial
//! collection, only complete states, possibly with intermediate states
//! elided.
//!
//! ## Session Version
//! The opening and closure logs share one monotonic version counter. Every
//! mutation of either log bumps it, and appends can be made conditional on
//! it (`expected_version`), which is how the register engine closes the
//! double-open race. See [`RecordStore::append_opening`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_store::{MemoryStore, RecordStore};
//!
//! let store = MemoryStore::new();
//! let version = store.session_version().await?;
//! store.append_opening(opening, version).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{Access, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{subscribe, RecordStore, Subscription};
