use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use lotocifras_db::models::Grouping;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Impossible d'accéder à {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON invalide : {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration invalide : {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Échec du comptage {grouping} depuis le {since}")]
    Query {
        grouping: Grouping,
        since: NaiveDate,
        #[source]
        source: BoxError,
    },

    #[error("Agrégation annulée après {completed} fenêtre(s)")]
    Cancelled { completed: usize },
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Échec de l'ingestion")]
    Ingestion(#[source] BoxError),

    #[error("Échec de l'agrégation des fréquences")]
    Aggregation(#[from] AggregationError),

    #[error("Échec du calcul des numéros jamais sortis")]
    UnplayedCount(#[source] BoxError),

    #[error("Analyse annulée")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
