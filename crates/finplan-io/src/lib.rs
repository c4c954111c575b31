//! JSON import and export for the finplan ledger
//!
//! Import is two-phase. The whole document is parsed and every record is
//! validated into a [`StagedImport`]; only when nothing failed is the staged
//! set swapped into the ledger. A rejected import leaves the ledger exactly as
//! it was.

use finplan_core::{Ledger, LedgerSummary};
use log::{info, warn};

pub mod document;
pub mod error;
mod fields;

pub use document::StagedImport;
pub use error::CodecError;

/// Codec reference type
pub type CodecRef = Box<dyn LedgerCodec>;

/// Trait for ledger document formats
pub trait LedgerCodec {
    /// Serialize the whole ledger
    fn export(&self, ledger: &Ledger) -> Result<String, CodecError>;

    /// Parse and validate a document without touching any ledger
    fn stage(&self, text: &str) -> Result<StagedImport, CodecError>;

    /// Replace the ledger's contents with the document, or change nothing
    fn import(&self, ledger: &mut Ledger, text: &str) -> Result<LedgerSummary, CodecError> {
        match self.stage(text) {
            Ok(staged) => {
                let summary = staged.commit(ledger);
                info!("Import committed: {} records", summary.total());
                Ok(summary)
            }
            Err(e) => {
                warn!("Import aborted, ledger unchanged: {}", e);
                Err(e)
            }
        }
    }
}

/// Indented JSON with `incomes`, `expenses` and `subscriptions` arrays
#[derive(Debug, Default)]
pub struct JsonCodec;

impl LedgerCodec for JsonCodec {
    fn export(&self, ledger: &Ledger) -> Result<String, CodecError> {
        let document = document::LedgerDocument::from_ledger(ledger);
        serde_json::to_string_pretty(&document)
            .map_err(|e| CodecError::structure(format!("could not encode ledger: {}", e)))
    }

    fn stage(&self, text: &str) -> Result<StagedImport, CodecError> {
        document::stage(text)
    }
}

/// Export with the default JSON codec
pub fn export_json(ledger: &Ledger) -> Result<String, CodecError> {
    JsonCodec.export(ledger)
}

/// Import with the default JSON codec
pub fn import_json(ledger: &mut Ledger, text: &str) -> Result<LedgerSummary, CodecError> {
    JsonCodec.import(ledger, text)
}

/// Dry run: report what an import would load
pub fn validate_json(text: &str) -> Result<LedgerSummary, CodecError> {
    JsonCodec.stage(text).map(|staged| staged.summary())
}

// ==================== Tests ====================
