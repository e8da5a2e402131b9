use std::path::Path;

use serde::{Deserialize, Serialize};

use lotocifras_db::models::{Grouping, CODE_SPACE};

use crate::error::ConfigError;
use crate::schedule::{DEFAULT_CEILING, DEFAULT_PADDING_DAYS};

/// Facteurs de pondération appliqués aux ratios de fréquence.
///
/// Les valeurs par défaut sont des réglages manuels provisoires ; elles sont
/// exposées ici pour pouvoir être ajustées (recherche évolutive, etc.) sans
/// toucher au code de l'agrégateur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Positions 1..4.
    pub single: [f64; 4],
    /// (1,2), (1,3), (1,4), (2,3), (2,4), (3,4).
    pub pair: [f64; 6],
    /// (1,2,3), (1,2,4), (1,3,4), (2,3,4).
    pub triple: [f64; 4],
    pub complete: f64,
    pub pair_scale: f64,
    pub triple_scale: f64,
    pub complete_scale: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            single: [1.0, 1.9, 2.69, 2.69],
            pair: [1.0, 1.45, 1.45, 1.55, 1.55, 5.0],
            triple: [1.0, 1.0, 5.0, 5.0],
            complete: 1.0,
            pair_scale: 10.0,
            triple_scale: 100.0,
            complete_scale: 1000.0,
        }
    }
}

impl ScoringWeights {
    pub fn weight(&self, grouping: Grouping) -> f64 {
        let slot = grouping.slot();
        match grouping.arity() {
            1 => self.single[slot],
            2 => self.pair[slot - 4],
            3 => self.triple[slot - 10],
            _ => self.complete,
        }
    }

    pub fn scale(&self, grouping: Grouping) -> f64 {
        match grouping.arity() {
            1 => 1.0,
            2 => self.pair_scale,
            3 => self.triple_scale,
            _ => self.complete_scale,
        }
    }

    fn all_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.single
            .iter()
            .chain(&self.pair)
            .chain(&self.triple)
            .copied()
            .chain([self.complete, self.pair_scale, self.triple_scale, self.complete_scale])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Borne (exclue) des décalages de la suite de fenêtres, en jours.
    pub schedule_ceiling: u32,
    /// Jours ajoutés à chaque décalage pour obtenir la date de coupure.
    pub window_padding_days: u32,
    pub top_k: usize,
    /// Évaluation des candidats répartie sur rayon.
    pub parallel: bool,
    pub weights: ScoringWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schedule_ceiling: DEFAULT_CEILING,
            window_padding_days: DEFAULT_PADDING_DAYS,
            top_k: 100,
            parallel: true,
            weights: ScoringWeights::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 || self.top_k > CODE_SPACE {
            return Err(ConfigError::Invalid(format!(
                "top_k doit être compris entre 1 et {CODE_SPACE} (reçu {})",
                self.top_k
            )));
        }
        if self.schedule_ceiling < 2 {
            return Err(ConfigError::Invalid(format!(
                "schedule_ceiling doit être au moins 2 (reçu {})",
                self.schedule_ceiling
            )));
        }
        if let Some(bad) = self.weights.all_values().find(|w| !w.is_finite()) {
            return Err(ConfigError::Invalid(format!("poids non fini : {bad}")));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
