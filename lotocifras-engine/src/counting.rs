use anyhow::Result;
use chrono::NaiveDate;

use lotocifras_db::db;
use lotocifras_db::models::{GroupedCount, Grouping};
use lotocifras_db::rusqlite::Connection;

/// Source des comptages historiques consommée par l'agrégateur.
pub trait CountingSource {
    /// Occurrences de chaque n-uplet du regroupement parmi les tirages
    /// strictement postérieurs à `since`.
    fn grouped_counts(&self, grouping: Grouping, since: NaiveDate) -> Result<Vec<GroupedCount>>;

    /// Codes distincts apparus au moins une fois, sur tout l'historique.
    fn occurred_codes(&self) -> Result<Vec<u16>>;
}

impl CountingSource for Connection {
    fn grouped_counts(&self, grouping: Grouping, since: NaiveDate) -> Result<Vec<GroupedCount>> {
        db::grouped_counts(self, grouping, since)
    }

    fn occurred_codes(&self) -> Result<Vec<u16>> {
        db::occurred_codes(self)
    }
}
