//! # Closure Report Rendering
//!
//! Formats a closure record into the plain-text end-of-day summary that is
//! sent to the configured report contact (and shown to the operator).
//!
//! ## Layout
//! ```text
//! ==========================================
//!  Almacén Don Mario
//!  Av. Siempreviva 742
//!  Tel: 11-5555-0000
//! ==========================================
//!  REGISTER CLOSURE - 2024-03-01 22:00 UTC
//! ------------------------------------------
//!  Opening float          $10.00
//!  Sales (all methods)    $10.00
//!  Sales (digital)         $3.00
//!  Expenses                $1.00
//!  Transactions                3
//! ------------------------------------------
//!  EXPECTED DRAWER CASH   $16.00
//! ------------------------------------------
//!  Notes: end of day
//!  ¡Gracias por su compra!
//! ==========================================
//! ```
//!
//! The layout is deterministic for a given closure and settings, so tests
//! (and humans diffing two reports) can rely on it line by line.

use tally_core::money::Money;
use tally_core::types::{CashClosure, CompanySettings};

/// Report line width.
const WIDTH: usize = 42;

// =============================================================================
// Rendering
// =============================================================================

/// Renders the end-of-day report for a closure.
pub fn render_closure_report(closure: &CashClosure, settings: &CompanySettings) -> String {
    let rule = "=".repeat(WIDTH);
    let thin = "-".repeat(WIDTH);

    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');

    for line in [&settings.name, &settings.address] {
        if !line.is_empty() {
            out.push_str(&format!(" {line}\n"));
        }
    }
    if !settings.phone.is_empty() {
        out.push_str(&format!(" Tel: {}\n", settings.phone));
    }

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        " REGISTER CLOSURE - {}\n",
        closure.date.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&thin);
    out.push('\n');

    out.push_str(&amount_line("Opening float", closure.initial_amount));
    out.push_str(&amount_line("Sales (all methods)", closure.total_sales));
    out.push_str(&amount_line("Sales (digital)", closure.total_digital));
    out.push_str(&amount_line("Expenses", closure.total_expenses));
    out.push_str(&count_line("Transactions", closure.transaction_count));

    out.push_str(&thin);
    out.push('\n');
    out.push_str(&amount_line("EXPECTED DRAWER CASH", closure.total_cash));
    out.push_str(&thin);
    out.push('\n');

    if let Some(notes) = &closure.notes {
        out.push_str(&format!(" Notes: {notes}\n"));
    }
    if !settings.footer_message.is_empty() {
        out.push_str(&format!(" {}\n", settings.footer_message));
    }

    out.push_str(&rule);
    out.push('\n');
    out
}

/// One `label .... $amount` line, right-aligned within [`WIDTH`].
fn amount_line(label: &str, amount: Money) -> String {
    let value = amount.to_string();
    let pad = WIDTH.saturating_sub(1 + label.len() + value.len());
    format!(" {label}{}{value}\n", " ".repeat(pad.max(1)))
}

/// One `label .... n` line for plain counts.
fn count_line(label: &str, count: u32) -> String {
    let value = count.to_string();
    let pad = WIDTH.saturating_sub(1 + label.len() + value.len());
    format!(" {label}{}{value}\n", " ".repeat(pad.max(1)))
}

// =============================================================================
// Unit Tests
// =============================================================================
