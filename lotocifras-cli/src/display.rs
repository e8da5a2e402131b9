use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use lotocifras_db::models::{DrawResult, Grouping, CODE_SPACE};
use lotocifras_engine::analysis::AnalysisResult;
use lotocifras_engine::ingest::IngestReport;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_results(results: &[DrawResult]) {
    if results.is_empty() {
        println!("Aucun résultat à afficher.");
        return;
    }

    let mut table = new_table(vec!["Date", "Numéro", "Signe"]);
    for result in results {
        table.add_row(vec![
            result.date.clone(),
            result.number(),
            result.sign.to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(report: &IngestReport) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", report.total_records);
    println!("  Insérés           : {}", report.inserted);
    println!("  Ignorés           : {}", report.skipped);
    if report.errors > 0 {
        println!("  Erreurs           : {}", report.errors);
    }
}

pub fn display_analysis(result: &AnalysisResult) {
    println!(
        "\nAnalyse du {} : {} fenêtres, {} candidats évalués en {:.2?}\n",
        result.timestamp.format("%d/%m/%Y %H:%M"),
        result.iterations_processed,
        result.total_candidates_evaluated,
        result.execution_time,
    );

    let mut table = new_table(vec!["Rang", "Numéro", "Score"]);
    for (rank, (number, score)) in result.best_numbers.iter().zip(&result.best_scores).enumerate() {
        let score_cell = if *score == 0.0 {
            Cell::new(format!("{score:.4}")).fg(Color::Green)
        } else {
            Cell::new(format!("{score:.4}"))
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(format!("{number:04}")),
            score_cell,
        ]);
    }
    println!("{table}");

    display_unplayed(result.unplayed_count);
}

pub fn display_breakdown(code: u16, parts: &[(Grouping, f64)]) {
    let mut table = new_table(vec!["Regroupement", "Cellule", "Contribution"]);
    let digits = lotocifras_db::models::digits_of(code);

    for (grouping, value) in parts {
        let cell: String = grouping
            .positions()
            .iter()
            .map(|p| char::from(b'0' + digits[p.index()]))
            .collect();
        table.add_row(vec![
            grouping.label(),
            cell,
            format!("{value:.4}"),
        ]);
    }

    let total: f64 = parts.iter().map(|(_, v)| v).sum();
    println!("Score de {code:04} : {total:.4}\n");
    println!("{table}");
}

pub fn display_unplayed(unplayed: usize) {
    let played = CODE_SPACE - unplayed;
    println!(
        "Numéros jamais sortis : {} / {} ({:.1} % déjà tirés)",
        unplayed,
        CODE_SPACE,
        played as f64 / CODE_SPACE as f64 * 100.0
    );
}
