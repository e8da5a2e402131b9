use chrono::NaiveDate;
use log::{debug, warn};

use lotocifras_db::models::{GroupedCount, Grouping};

use crate::cancel::CancellationToken;
use crate::config::{AnalysisConfig, ScoringWeights};
use crate::counting::CountingSource;
use crate::error::AggregationError;
use crate::schedule::{cutoff_date, LookbackSchedule};
use crate::tables::FrequencyTables;

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub tables: FrequencyTables,
    /// Nombre de fenêtres de la suite effectivement accumulées.
    pub iterations: usize,
}

/// Comptages des 15 regroupements pour une même date de coupure.
#[derive(Debug, Clone)]
pub struct WindowCounts {
    pub cutoff: NaiveDate,
    pub groups: Vec<(Grouping, Vec<GroupedCount>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowProgress {
    pub iteration: usize,
    pub offset: u32,
    pub cutoff: NaiveDate,
}

/// Interroge la source pour tous les regroupements. Aucune table n'est
/// touchée ici : une fenêtre n'est appliquée qu'une fois complète.
pub fn collect_window<S: CountingSource + ?Sized>(
    source: &S,
    cutoff: NaiveDate,
) -> Result<WindowCounts, AggregationError> {
    let groups = Grouping::ALL
        .iter()
        .map(|&grouping| {
            source
                .grouped_counts(grouping, cutoff)
                .map(|counts| (grouping, counts))
                .map_err(|e| AggregationError::Query {
                    grouping,
                    since: cutoff,
                    source: e.into(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(WindowCounts { cutoff, groups })
}

/// Ajoute les ratios pondérés d'une fenêtre aux tables.
pub fn accumulate(tables: &mut FrequencyTables, window: &WindowCounts, weights: &ScoringWeights) {
    for (grouping, counts) in &window.groups {
        accumulate_grouping(tables, *grouping, counts, weights);
    }
}

fn accumulate_grouping(
    tables: &mut FrequencyTables,
    grouping: Grouping,
    counts: &[GroupedCount],
    weights: &ScoringWeights,
) {
    let valid: Vec<&GroupedCount> = counts
        .iter()
        .filter(|c| c.values.len() == grouping.arity() && c.values.iter().all(|&d| d <= 9))
        .collect();
    if valid.len() != counts.len() {
        warn!(
            "{} n-uplet(s) invalide(s) ignoré(s) pour {grouping}",
            counts.len() - valid.len()
        );
    }

    let total: u64 = valid.iter().map(|c| u64::from(c.count)).sum();
    if total == 0 {
        debug!("Regroupement {grouping} vide, fenêtre ignorée");
        return;
    }

    let weight = weights.weight(grouping);
    let scale = weights.scale(grouping);
    let table = tables.table_mut(grouping);
    for c in valid {
        table[c.key()] += c.count as f64 / total as f64 * weight * scale;
    }
}

pub fn aggregate<S: CountingSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
    today: NaiveDate,
    cancel: &CancellationToken,
) -> Result<Aggregation, AggregationError> {
    aggregate_observed(source, config, today, cancel, |_| {})
}

/// Parcourt la suite de fenêtres et cumule les fréquences de chacune.
///
/// Les fenêtres sont emboîtées (toutes partent d'aujourd'hui), donc une
/// combinaison fréquente à plusieurs échelles est renforcée d'autant.
/// L'annulation est vérifiée avant chaque fenêtre ; une erreur ou une
/// annulation abandonne toutes les tables.
pub fn aggregate_observed<S, F>(
    source: &S,
    config: &AnalysisConfig,
    today: NaiveDate,
    cancel: &CancellationToken,
    mut on_window: F,
) -> Result<Aggregation, AggregationError>
where
    S: CountingSource + ?Sized,
    F: FnMut(&WindowProgress),
{
    LookbackSchedule::new(config.schedule_ceiling).try_fold(
        Aggregation::default(),
        |mut acc, offset| {
            if cancel.is_cancelled() {
                return Err(AggregationError::Cancelled {
                    completed: acc.iterations,
                });
            }

            let cutoff = cutoff_date(today, offset, config.window_padding_days);
            let window = collect_window(source, cutoff)?;
            accumulate(&mut acc.tables, &window, &config.weights);
            acc.iterations += 1;

            debug!("Fenêtre {} : décalage {offset} j, depuis le {cutoff}", acc.iterations);
            on_window(&WindowProgress {
                iteration: acc.iterations,
                offset,
                cutoff,
            });
            Ok(acc)
        },
    )
}
