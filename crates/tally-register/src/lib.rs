//! # tally-register: Register Engine for Tally POS
//!
//! This crate orchestrates the pure logic in `tally-core` over the record
//! store in `tally-store`: it is the layer a terminal application talks to.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  Host application (terminal, UI)                                        │
//! │       │  open / ring sales / amend / close                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tally-register (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌──────────┐  ┌──────────┐  │   │
//! │  │  │  Register  │  │  Snapshot    │  │  Report  │  │  Collab  │  │   │
//! │  │  │ operations │  │  projector   │  │ renderer │  │  seams   │  │   │
//! │  │  └─────┬──────┘  └──────┬───────┘  └────┬─────┘  └────┬─────┘  │   │
//! │  └────────┼────────────────┼───────────────┼─────────────┼────────┘   │
//! │           ▼                ▼               ▼             ▼            │
//! │     tally-store       watch channels   ReportSink   StockControl      │
//! │   (RecordStore)    (RegisterSnapshot)  (external)    (external)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - Session state is never stored: every answer is derived from the live
//!   collection snapshots at the moment of asking
//! - Open and close are conditional writes on the session-log version, so
//!   two racing terminals cannot both win
//! - Report dispatch and stock adjustment are best-effort collaborators; a
//!   failure there never rolls back a register operation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tally_register::Register;
//! use tally_store::MemoryStore;
//!
//! let register = Register::new(Arc::new(MemoryStore::new()));
//! let opening = register.open_register(Money::from_cents(1000), None).await?;
//! // ... sales, expenses ...
//! let closure = register.close_register(Some("end of day".into())).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collab;
pub mod error;
pub mod register;
pub mod report;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use collab::{CollabError, ReportSink, StockControl};
pub use error::{RegisterError, RegisterResult};
pub use register::Register;
pub use report::render_closure_report;
pub use snapshot::{ProjectorHandle, RegisterSnapshot, SnapshotProjector};
