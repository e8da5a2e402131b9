mod display;
mod import;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use lotocifras_db::db::{count_results, db_path, fetch_last_results, insert_result, migrate, open_db};
use lotocifras_db::models::{code_of, parse_number, validate_result, DrawResult, Sign};
use lotocifras_db::rusqlite::Connection;
use lotocifras_engine::aggregator::aggregate;
use lotocifras_engine::analysis::{unplayed_count, Analyzer};
use lotocifras_engine::cancel::CancellationToken;
use lotocifras_engine::config::AnalysisConfig;
use lotocifras_engine::ingest::{Ingestor, NoIngestion};
use lotocifras_engine::schedule::iteration_count;
use lotocifras_engine::scorer::breakdown;

use crate::display::{
    display_analysis, display_breakdown, display_import_summary, display_results,
    display_unplayed,
};
use crate::import::{parse_date, CsvIngestor};

#[derive(Parser)]
#[command(name = "lotocifras", about = "Analyse de fréquences des tirages à quatre chiffres")]
struct Cli {
    /// Chemin de la base SQLite (par défaut : data/lotocifras.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les résultats depuis un fichier CSV (date;numéro;signe)
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers résultats
    List {
        /// Nombre de résultats à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Ajouter un résultat manuellement
    Add,

    /// Lancer l'analyse complète et afficher les meilleurs candidats
    Analyze {
        /// Fichier CSV à ingérer avant l'analyse (reprise après la dernière date)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Nombre de candidats retenus
        #[arg(short, long)]
        top: Option<usize>,

        /// Borne de la suite de fenêtres, en jours
        #[arg(long)]
        ceiling: Option<u32>,

        /// Fichier de configuration JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Date de référence des fenêtres (AAAA-MM-JJ)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Sortie JSON
        #[arg(long)]
        json: bool,

        /// Désactiver l'évaluation parallèle
        #[arg(long)]
        sequential: bool,
    },

    /// Détailler le score d'un numéro
    Score {
        /// Numéro à quatre chiffres (ex: 0427)
        number: String,

        /// Fichier de configuration JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Date de référence des fenêtres (AAAA-MM-JJ)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Compter les numéros jamais sortis
    Unplayed,

    /// Écrire la configuration par défaut
    Config {
        /// Fichier de sortie
        #[arg(short, long, default_value = "lotocifras.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(db_path);

    if let Command::Config { output } = &cli.command {
        return cmd_config(output);
    }

    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Add => cmd_add(&conn),
        Command::Analyze {
            file,
            top,
            ceiling,
            config,
            as_of,
            json,
            sequential,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(top) = top {
                config.top_k = top;
            }
            if let Some(ceiling) = ceiling {
                config.schedule_ceiling = ceiling;
            }
            if sequential {
                config.parallel = false;
            }
            cmd_analyze(&conn, file, config, as_of, json)
        }
        Command::Score { number, config, as_of } => {
            let config = load_config(config.as_deref())?;
            cmd_score(&conn, &number, &config, as_of)
        }
        Command::Unplayed => cmd_unplayed(&conn),
        Command::Config { .. } => Ok(()),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::load(p)
            .with_context(|| format!("Configuration illisible : {}", p.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn ensure_not_empty(conn: &Connection) -> Result<bool> {
    if count_results(conn)? == 0 {
        println!("Base vide. Lancez d'abord : lotocifras import --file <CSV>");
        return Ok(false);
    }
    Ok(true)
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let report = import::import_csv(conn, file, None, &CancellationToken::new())?;
    display_import_summary(&report);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    if !ensure_not_empty(conn)? {
        return Ok(());
    }
    let results = fetch_last_results(conn, last)?;
    display_results(&results);
    Ok(())
}

fn cmd_analyze(
    conn: &Connection,
    file: Option<PathBuf>,
    config: AnalysisConfig,
    as_of: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let csv_ingestor;
    let ingestor: &dyn Ingestor = match file {
        Some(path) => {
            csv_ingestor = CsvIngestor::new(conn, path);
            &csv_ingestor
        }
        None => &NoIngestion,
    };

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(iteration_count(config.schedule_ceiling) as u64)
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut analyzer = Analyzer::new(conn, ingestor, config);
    if let Some(date) = as_of {
        analyzer = analyzer.as_of(date);
    }

    let result = analyzer.run_observed(&cancel, |progress| {
        pb.set_message(format!("coupure au {}", progress.cutoff));
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display_analysis(&result);
    }
    Ok(())
}

fn cmd_score(
    conn: &Connection,
    number: &str,
    config: &AnalysisConfig,
    as_of: Option<NaiveDate>,
) -> Result<()> {
    let code = code_of(&parse_number(number)?);
    if !ensure_not_empty(conn)? {
        return Ok(());
    }

    config.validate()?;
    let today = as_of.unwrap_or_else(|| Local::now().date_naive());
    let aggregation = aggregate(conn, config, today, &CancellationToken::new())?;
    display_breakdown(code, &breakdown(code, &aggregation.tables));
    Ok(())
}

fn cmd_unplayed(conn: &Connection) -> Result<()> {
    if !ensure_not_empty(conn)? {
        return Ok(());
    }
    display_unplayed(unplayed_count(conn)?);
    Ok(())
}

fn cmd_config(output: &Path) -> Result<()> {
    AnalysisConfig::default().save(output)?;
    println!("Configuration par défaut écrite dans {}", output.display());
    Ok(())
}

fn cmd_add(conn: &Connection) -> Result<()> {
    println!("Ajout d'un résultat manuellement\n");

    let date = loop {
        let raw = prompt("Date (JJ/MM/AAAA) : ")?;
        match parse_date(&raw) {
            Ok(date) => break date,
            Err(e) => println!("{e}. Réessayez."),
        }
    };

    let digits = loop {
        let raw = prompt("Numéro (4 chiffres, ex: 0427) : ")?;
        match parse_number(&raw) {
            Ok(digits) => break digits,
            Err(e) => println!("{e}. Réessayez."),
        }
    };

    let sign = Sign::from_name(&prompt("Signe (ex: Leo, laisser vide si inconnu) : ")?);

    let result = DrawResult { date, digits, sign };
    validate_result(&result)?;

    println!("\nRésultat à insérer :");
    display_results(std::slice::from_ref(&result));

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        if insert_result(conn, &result)? {
            println!("Résultat inséré avec succès.");
        } else {
            println!("Un résultat existe déjà à cette date (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}
