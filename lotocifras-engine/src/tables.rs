use lotocifras_db::models::{Grouping, Position};

/// Accumulateurs de fréquences pondérées, une table par regroupement.
///
/// Créées vides pour chaque analyse, remplies par l'agrégateur puis lues
/// par le scoreur. Jamais persistées.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTables {
    cells: [Vec<f64>; Grouping::COUNT],
}

impl Default for FrequencyTables {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTables {
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|i| vec![0.0; Grouping::ALL[i].table_len()]),
        }
    }

    pub fn table(&self, grouping: Grouping) -> &[f64] {
        &self.cells[grouping.slot()]
    }

    pub fn table_mut(&mut self, grouping: Grouping) -> &mut [f64] {
        &mut self.cells[grouping.slot()]
    }

    pub fn single(&self, position: Position) -> &[f64] {
        self.table(Grouping::SINGLES[position.index()])
    }

    pub fn complete(&self) -> &[f64] {
        self.table(Grouping::Complete)
    }

    pub fn cell(&self, grouping: Grouping, index: usize) -> f64 {
        self.table(grouping)[index]
    }

    pub fn add(&mut self, grouping: Grouping, index: usize, value: f64) {
        self.table_mut(grouping)[index] += value;
    }

    /// Ajoute cellule par cellule les valeurs d'un autre jeu de tables.
    pub fn merge(&mut self, other: &FrequencyTables) {
        for (mine, theirs) in self.cells.iter_mut().zip(&other.cells) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.cells.iter().flatten().all(|&v| v == 0.0)
    }
}
