use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::models::{code_of, DrawResult, GroupedCount, Grouping, Sign};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS results (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    date    TEXT NOT NULL UNIQUE,
    first   INTEGER NOT NULL,
    second  INTEGER NOT NULL,
    third   INTEGER NOT NULL,
    fourth  INTEGER NOT NULL,
    sign    TEXT NOT NULL DEFAULT 'Z'
);
CREATE INDEX IF NOT EXISTS idx_results_date ON results(date);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotocifras.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Retourne `false` si un résultat existe déjà pour cette date.
pub fn insert_result(conn: &Connection, result: &DrawResult) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO results (date, first, second, third, fourth, sign)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            result.date,
            result.digits[0],
            result.digits[1],
            result.digits[2],
            result.digits[3],
            result.sign.letter().to_string(),
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

fn row_to_result(row: &rusqlite::Row<'_>) -> rusqlite::Result<DrawResult> {
    let sign: String = row.get(5)?;
    Ok(DrawResult {
        date: row.get(0)?,
        digits: [
            row.get::<_, u8>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
        ],
        sign: Sign::from_letter(sign.chars().next().unwrap_or('Z')),
    })
}

pub fn last_result(conn: &Connection) -> Result<Option<DrawResult>> {
    let result = conn
        .query_row(
            "SELECT date, first, second, third, fourth, sign
             FROM results ORDER BY date DESC LIMIT 1",
            [],
            row_to_result,
        )
        .optional()
        .context("Échec de la lecture du dernier résultat")?;
    Ok(result)
}

pub fn fetch_last_results(conn: &Connection, limit: u32) -> Result<Vec<DrawResult>> {
    let mut stmt = conn.prepare(
        "SELECT date, first, second, third, fourth, sign
         FROM results ORDER BY date DESC LIMIT ?1"
    )?;
    let results = stmt.query_map([limit], row_to_result)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(results)
}

pub fn count_results(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
    Ok(count)
}

/// Occurrences par n-uplet de chiffres pour les tirages strictement
/// postérieurs à `since`.
pub fn grouped_counts(conn: &Connection, grouping: Grouping, since: NaiveDate) -> Result<Vec<GroupedCount>> {
    // Les colonnes viennent de l'énumération fermée `Grouping`, jamais de l'appelant.
    let columns = grouping.column_list();
    let sql = format!(
        "SELECT COUNT(*), {columns} FROM results WHERE date > ?1 GROUP BY {columns} ORDER BY {columns}"
    );
    let arity = grouping.arity();
    let since = since.format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(&sql)
        .with_context(|| format!("Requête invalide pour le regroupement {grouping}"))?;
    let counts = stmt.query_map([since.as_str()], |row| {
        let count: u32 = row.get(0)?;
        let mut values = Vec::with_capacity(arity);
        for i in 0..arity {
            values.push(row.get::<_, u8>(i + 1)?);
        }
        Ok(GroupedCount { values, count })
    })?.collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Échec du comptage {grouping} depuis {since}"))?;
    Ok(counts)
}

/// Codes distincts apparus au moins une fois dans tout l'historique.
pub fn occurred_codes(conn: &Connection) -> Result<Vec<u16>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT first, second, third, fourth FROM results"
    )?;
    let codes = stmt.query_map([], |row| {
        Ok(code_of(&[
            row.get::<_, u8>(0)?,
            row.get::<_, u8>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
        ]))
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_result(date: &str, number: &str) -> DrawResult {
        DrawResult {
            date: date.to_string(),
            digits: crate::models::parse_number(number).unwrap(),
            sign: Sign::Leo,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        insert_result(&conn, &test_result("2024-01-01", "1234")).unwrap();
        insert_result(&conn, &test_result("2024-01-02", "1299")).unwrap();
        insert_result(&conn, &test_result("2024-01-03", "5234")).unwrap();
        insert_result(&conn, &test_result("2024-01-04", "1234")).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(count_results(&conn).unwrap(), 0);

        insert_result(&conn, &test_result("2024-01-01", "0007")).unwrap();
        assert_eq!(count_results(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_date_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        assert!(insert_result(&conn, &test_result("2024-01-01", "0007")).unwrap());
        assert!(!insert_result(&conn, &test_result("2024-01-01", "9999")).unwrap());
        assert_eq!(count_results(&conn).unwrap(), 1);
    }

    #[test]
    fn test_last_result() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert!(last_result(&conn).unwrap().is_none());

        let conn = seeded();
        let last = last_result(&conn).unwrap().unwrap();
        assert_eq!(last.date, "2024-01-04");
        assert_eq!(last.number(), "1234");
        assert_eq!(last.sign, Sign::Leo);
    }

    #[test]
    fn test_fetch_order() {
        let conn = seeded();
        let results = fetch_last_results(&conn, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].date, "2024-01-04");
        assert_eq!(results[1].date, "2024-01-03");
    }

    #[test]
    fn test_grouped_counts_single_position() {
        let conn = seeded();
        let counts = grouped_counts(&conn, Grouping::First, day("2023-12-31")).unwrap();
        assert_eq!(counts, vec![
            GroupedCount { values: vec![1], count: 3 },
            GroupedCount { values: vec![5], count: 1 },
        ]);
    }

    #[test]
    fn test_grouped_counts_since_is_exclusive() {
        let conn = seeded();
        let counts = grouped_counts(&conn, Grouping::Complete, day("2024-01-02")).unwrap();
        assert_eq!(counts, vec![
            GroupedCount { values: vec![1, 2, 3, 4], count: 1 },
            GroupedCount { values: vec![5, 2, 3, 4], count: 1 },
        ]);
    }

    #[test]
    fn test_grouped_counts_pair_order() {
        let conn = seeded();
        let counts = grouped_counts(&conn, Grouping::SecondFourth, day("2023-12-31")).unwrap();
        let total: u32 = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, 4);
        let key_24 = counts.iter().find(|c| c.key() == 24).unwrap();
        assert_eq!(key_24.count, 3);
        let key_29 = counts.iter().find(|c| c.key() == 29).unwrap();
        assert_eq!(key_29.count, 1);
    }

    #[test]
    fn test_grouped_counts_empty_window() {
        let conn = seeded();
        let counts = grouped_counts(&conn, Grouping::FirstSecondThird, day("2030-01-01")).unwrap();
        assert!(counts.is_empty());
    }

    #[test]
    fn test_occurred_codes_distinct() {
        let conn = seeded();
        let mut codes = occurred_codes(&conn).unwrap();
        codes.sort();
        assert_eq!(codes, vec![1234, 1299, 5234]);
    }
}
