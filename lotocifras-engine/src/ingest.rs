use anyhow::Result;
use serde::Serialize;

use crate::cancel::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Alimente le stock de résultats jusqu'à aujourd'hui.
///
/// Doit être idempotent : chaque date n'est enregistrée qu'une fois.
pub trait Ingestor {
    fn ingest_from_last_known_date(&self, cancel: &CancellationToken) -> Result<IngestReport>;
}

/// Analyse le stock tel quel, sans nouvel import.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIngestion;

impl Ingestor for NoIngestion {
    fn ingest_from_last_known_date(&self, _cancel: &CancellationToken) -> Result<IngestReport> {
        Ok(IngestReport::default())
    }
}
