//! # Collaborator Seams
//!
//! The two external systems the register talks to, behind object-safe
//! async traits so hosts can plug in whatever transport they have.
//!
//! Both collaborators are best-effort from the engine's point of view: a
//! failed report delivery or stock adjustment is logged and surfaced, never
//! allowed to roll back the register operation that triggered it.

use async_trait::async_trait;

// =============================================================================
// Collaborator Error
// =============================================================================

/// Whatever error a collaborator implementation produces.
///
/// The engine only logs these, so the type stays opaque.
pub type CollabError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Report Sink
// =============================================================================

/// Accepts a fully formatted text report for delivery to a destination
/// address (a chat contact, a printer spool, a log).
///
/// ## Contract
/// Fire-and-forget: the engine dispatches the closure report on a spawned
/// task and never waits for, or acts on, the outcome beyond a warning log.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Delivers `report` to `destination`.
    async fn deliver(&self, destination: &str, report: &str) -> Result<(), CollabError>;
}

// =============================================================================
// Stock Control
// =============================================================================

/// The inventory collaborator.
///
/// ## Contract
/// `delta` is signed: negative moves units off the shelf (a sale), positive
/// returns them. Implementations clamp stock at zero. The register calls
/// this from the checkout path only; sale amendments and deletions report a
/// [`StockDelta`](tally_core::amend::StockDelta) advisory instead of
/// adjusting anything themselves.
#[async_trait]
pub trait StockControl: Send + Sync {
    /// Adjusts one product's stock by a signed number of units.
    async fn adjust_stock(&self, product_id: &str, delta: i64) -> Result<(), CollabError>;
}
