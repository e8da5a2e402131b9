use lotocifras_db::models::{digits_of, Grouping, CODE_SPACE};

use crate::tables::FrequencyTables;

/// Score composite d'un candidat : somme des 15 cellules qui le concernent
/// (4 chiffres, 6 paires, 4 triplets, le code complet).
///
/// Chaque regroupement lit sa table avec son propre ordre de chiffres, par
/// exemple la paire (1,3) lit l'index `d[0] * 10 + d[2]`.
pub fn score(candidate: u16, tables: &FrequencyTables) -> f64 {
    debug_assert!((candidate as usize) < CODE_SPACE);
    let digits = digits_of(candidate);
    Grouping::ALL
        .iter()
        .map(|&g| tables.cell(g, g.index_of(&digits)))
        .sum()
}

/// Contribution de chaque regroupement au score d'un candidat.
pub fn breakdown(candidate: u16, tables: &FrequencyTables) -> Vec<(Grouping, f64)> {
    let digits = digits_of(candidate);
    Grouping::ALL
        .iter()
        .map(|&g| (g, tables.cell(g, g.index_of(&digits))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_cell_contribution() {
        let mut tables = FrequencyTables::new();
        tables.add(Grouping::First, 7, 2.0);
        assert_eq!(score(7123, &tables), 2.0);
        assert_eq!(score(7000, &tables), 2.0);
        assert_eq!(score(1237, &tables), 0.0);
        assert_eq!(score(7, &tables), 0.0);
    }

    #[test]
    fn test_each_grouping_read_once() {
        let mut tables = FrequencyTables::new();
        let digits = [4, 8, 2, 1];
        for (i, g) in Grouping::ALL.iter().enumerate() {
            tables.add(*g, g.index_of(&digits), 2f64.powi(i as i32));
        }
        // Chaque bit correspond à un regroupement distinct.
        assert_eq!(score(4821, &tables), (2f64.powi(15)) - 1.0);
    }

    #[test]
    fn test_pair_tables_are_independent() {
        let mut tables = FrequencyTables::new();
        tables.add(Grouping::FirstThird, 12, 1.0);
        // 1?2? touche la paire (1,3) ; 12?? ne la touche pas.
        assert_eq!(score(1020, &tables), 1.0);
        assert_eq!(score(1200, &tables), 0.0);

        let mut tables = FrequencyTables::new();
        tables.add(Grouping::SecondFourth, 35, 1.0);
        assert_eq!(score(9395, &tables), 1.0);
        assert_eq!(score(9350, &tables), 0.0);
    }

    #[test]
    fn test_triple_digit_order() {
        let mut tables = FrequencyTables::new();
        tables.add(Grouping::FirstThirdFourth, 123, 1.0);
        assert_eq!(score(1923, &tables), 1.0);
        assert_eq!(score(2931, &tables), 0.0);
    }

    #[test]
    fn test_leading_zeros() {
        let mut tables = FrequencyTables::new();
        tables.add(Grouping::Complete, 7, 3.5);
        tables.add(Grouping::First, 0, 0.5);
        tables.add(Grouping::SecondThirdFourth, 7, 1.0);
        assert_eq!(score(7, &tables), 5.0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let mut tables = FrequencyTables::new();
        for g in Grouping::ALL {
            for i in 0..g.table_len() {
                tables.add(g, i, (i as f64 * 0.37).sin().abs() * 1.3);
            }
        }
        for c in [0u16, 1, 999, 4821, 9999] {
            assert_eq!(score(c, &tables).to_bits(), score(c, &tables).to_bits());
        }
    }

    #[test]
    fn test_breakdown_sums_to_score() {
        let mut tables = FrequencyTables::new();
        tables.add(Grouping::Third, 2, 1.5);
        tables.add(Grouping::FirstSecond, 48, 10.0);
        tables.add(Grouping::Complete, 4821, 100.0);

        let parts = breakdown(4821, &tables);
        assert_eq!(parts.len(), Grouping::COUNT);
        let total: f64 = parts.iter().map(|(_, v)| v).sum();
        assert_eq!(total, score(4821, &tables));
        assert_eq!(total, 111.5);
    }
}
