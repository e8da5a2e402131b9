use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::warn;

use lotocifras_db::db::{insert_result, last_result};
use lotocifras_db::models::{parse_number, validate_result, DrawResult, Sign};
use lotocifras_db::rusqlite::Connection;
use lotocifras_engine::cancel::CancellationToken;
use lotocifras_engine::ingest::{IngestReport, Ingestor};

/// JJ/MM/AAAA → AAAA-MM-JJ
pub fn parse_date(raw: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .with_context(|| format!("Format de date invalide: '{}'", raw))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Colonnes : date (JJ/MM/AAAA) ; numéro (4 chiffres) ; signe (facultatif).
fn parse_record(record: &csv::StringRecord) -> Result<DrawResult> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let date = parse_date(&get(0)?)?;
    let digits = parse_number(&get(1)?)?;
    let sign = Sign::from_name(&get(2).unwrap_or_default());

    let result = DrawResult { date, digits, sign };
    validate_result(&result)?;
    Ok(result)
}

/// Importe un fichier CSV dans une seule transaction.
///
/// Si `after` est fourni, seules les dates strictement postérieures sont
/// insérées. Une annulation abandonne la transaction entière.
pub fn import_csv(
    conn: &Connection,
    path: &Path,
    after: Option<&str>,
    cancel: &CancellationToken,
) -> Result<IngestReport> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut report = IngestReport::default();

    for record_result in reader.records() {
        if cancel.is_cancelled() {
            bail!("Import annulé après {} ligne(s)", report.total_records);
        }
        report.total_records += 1;

        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                warn!("Erreur lecture ligne {}: {}", report.total_records, e);
                report.errors += 1;
                continue;
            }
        };

        let result = match parse_record(&record) {
            Ok(result) => result,
            Err(e) => {
                warn!("Erreur parsing ligne {}: {:#}", report.total_records, e);
                report.errors += 1;
                continue;
            }
        };

        if after.is_some_and(|last| result.date.as_str() <= last) {
            report.skipped += 1;
            continue;
        }

        match insert_result(&tx, &result) {
            Ok(true) => report.inserted += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                warn!("Erreur insertion ligne {}: {:#}", report.total_records, e);
                report.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(report)
}

/// Ingestion incrémentale depuis un export CSV : reprend après la dernière
/// date connue de la base.
pub struct CsvIngestor<'a> {
    conn: &'a Connection,
    path: PathBuf,
}

impl<'a> CsvIngestor<'a> {
    pub fn new(conn: &'a Connection, path: PathBuf) -> Self {
        Self { conn, path }
    }
}

impl Ingestor for CsvIngestor<'_> {
    fn ingest_from_last_known_date(&self, cancel: &CancellationToken) -> Result<IngestReport> {
        let last = last_result(self.conn)?.map(|r| r.date);
        if let Some(date) = &last {
            log::debug!("Dernière date connue : {date}");
        }
        import_csv(self.conn, &self.path, last.as_deref(), cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use lotocifras_db::db::{count_results, fetch_last_results, migrate};

    fn store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "fecha;numero;signo").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("17/02/2026").unwrap(), "2026-02-17");
        assert_eq!(parse_date("01/01/2020").unwrap(), "2020-01-01");
        assert!(parse_date("2020-01-01").is_err());
        assert!(parse_date("31/02/2020").is_err());
    }

    #[test]
    fn test_import_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "results.csv", &[
            "02/02/2008;0123;Acuario",
            "03/02/2008;9876;escorpión",
            "03/02/2008;1111;leo",
            "04/02/2008;12x4;leo",
            "05/02/2008;0007",
        ]);
        let conn = store();
        let report = import_csv(&conn, &path, None, &CancellationToken::new()).unwrap();

        assert_eq!(report, IngestReport { total_records: 5, inserted: 3, skipped: 1, errors: 1 });
        assert_eq!(count_results(&conn).unwrap(), 3);

        let results = fetch_last_results(&conn, 10).unwrap();
        assert_eq!(results[0].number(), "0007");
        assert_eq!(results[0].sign, Sign::Unknown);
        assert_eq!(results[1].sign, Sign::Scorpio);
        assert_eq!(results[2].digits, [0, 1, 2, 3]);
    }

    #[test]
    fn test_ingestor_resumes_after_last_date() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_csv(&dir, "first.csv", &["02/02/2008;0123;aries", "03/02/2008;4567;tauro"]);
        let conn = store();
        let report = CsvIngestor::new(&conn, first)
            .ingest_from_last_known_date(&CancellationToken::new())
            .unwrap();
        assert_eq!(report.inserted, 2);

        let second = write_csv(&dir, "second.csv", &[
            "01/02/2008;5555;leo",
            "03/02/2008;4567;tauro",
            "04/02/2008;8888;libra",
        ]);
        let report = CsvIngestor::new(&conn, second.clone())
            .ingest_from_last_known_date(&CancellationToken::new())
            .unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(count_results(&conn).unwrap(), 3);

        let again = CsvIngestor::new(&conn, second)
            .ingest_from_last_known_date(&CancellationToken::new())
            .unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(count_results(&conn).unwrap(), 3);
    }

    #[test]
    fn test_cancelled_import_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "results.csv", &["02/02/2008;0123;aries"]);
        let conn = store();
        let token = CancellationToken::new();
        token.cancel();

        assert!(import_csv(&conn, &path, None, &token).is_err());
        assert_eq!(count_results(&conn).unwrap(), 0);
    }

    #[test]
    fn test_missing_file() {
        let conn = store();
        let err = import_csv(&conn, Path::new("/nonexistent.csv"), None, &CancellationToken::new());
        assert!(err.is_err());
    }
}
