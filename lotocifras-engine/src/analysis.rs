use std::collections::HashSet;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use log::info;
use serde::Serialize;

use lotocifras_db::models::CODE_SPACE;

use crate::aggregator::{aggregate_observed, WindowProgress};
use crate::cancel::CancellationToken;
use crate::config::AnalysisConfig;
use crate::counting::CountingSource;
use crate::error::{AggregationError, AnalysisError};
use crate::ingest::Ingestor;
use crate::selector::{par_select_top_k, select_top_k};

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub best_numbers: Vec<u16>,
    pub best_scores: Vec<f64>,
    pub total_candidates_evaluated: usize,
    pub iterations_processed: usize,
    pub execution_time: Duration,
    pub timestamp: DateTime<Local>,
    pub unplayed_count: usize,
}

/// Nombre de codes de l'univers jamais sortis dans l'historique complet.
pub fn unplayed_count<S: CountingSource + ?Sized>(source: &S) -> Result<usize> {
    let played: HashSet<u16> = source
        .occurred_codes()?
        .into_iter()
        .filter(|&c| (c as usize) < CODE_SPACE)
        .collect();
    Ok(CODE_SPACE - played.len())
}

/// Enchaîne ingestion, agrégation, sélection et comptage des numéros
/// jamais sortis. Chaque étape se termine avant la suivante.
pub struct Analyzer<'a, S: ?Sized, I: ?Sized> {
    source: &'a S,
    ingestor: &'a I,
    config: AnalysisConfig,
    today: Option<NaiveDate>,
}

impl<'a, S, I> Analyzer<'a, S, I>
where
    S: CountingSource + ?Sized,
    I: Ingestor + ?Sized,
{
    pub fn new(source: &'a S, ingestor: &'a I, config: AnalysisConfig) -> Self {
        Self {
            source,
            ingestor,
            config,
            today: None,
        }
    }

    /// Fixe la date de référence des fenêtres (par défaut : aujourd'hui).
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, cancel: &CancellationToken) -> Result<AnalysisResult, AnalysisError> {
        self.run_observed(cancel, |_| {})
    }

    pub fn run_observed<F>(
        &self,
        cancel: &CancellationToken,
        on_window: F,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        F: FnMut(&WindowProgress),
    {
        self.config.validate()?;
        let start = Instant::now();

        let report = self
            .ingestor
            .ingest_from_last_known_date(cancel)
            .map_err(|e| {
                if cancel.is_cancelled() {
                    AnalysisError::Cancelled
                } else {
                    AnalysisError::Ingestion(e.into())
                }
            })?;
        info!(
            "Ingestion : {} insérés, {} ignorés, {} erreurs",
            report.inserted, report.skipped, report.errors
        );
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let aggregation = aggregate_observed(self.source, &self.config, today, cancel, on_window)
            .map_err(|e| match e {
                AggregationError::Cancelled { .. } => AnalysisError::Cancelled,
                other => AnalysisError::Aggregation(other),
            })?;
        info!("Agrégation : {} fenêtres au {today}", aggregation.iterations);

        let top = if self.config.parallel {
            par_select_top_k(&aggregation.tables, self.config.top_k)
        } else {
            select_top_k(&aggregation.tables, self.config.top_k)
        };

        let unplayed = unplayed_count(self.source)
            .map_err(|e| AnalysisError::UnplayedCount(e.into()))?;

        let execution_time = start.elapsed();
        info!("Analyse terminée en {:?}", execution_time);

        Ok(AnalysisResult {
            best_numbers: top.numbers(),
            best_scores: top.scores(),
            total_candidates_evaluated: CODE_SPACE,
            iterations_processed: aggregation.iterations,
            execution_time,
            timestamp: Local::now(),
            unplayed_count: unplayed,
        })
    }
}
