use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;

use lotocifras_db::models::CODE_SPACE;

use crate::scorer::score;
use crate::tables::FrequencyTables;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked {
    pub number: u16,
    pub score: f64,
}

impl Ranked {
    /// Score croissant, puis numéro croissant à score égal.
    fn key_cmp(&self, other: &Ranked) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.number.cmp(&other.number))
    }
}

/// Les K meilleurs candidats (score le plus bas) vus jusqu'ici.
///
/// Un emplacement vide est `None` et passe après tout emplacement rempli ;
/// aucun numéro de l'espace des codes ne sert de valeur sentinelle.
#[derive(Debug, Clone)]
pub struct TopK {
    slots: Vec<Option<Ranked>>,
}

fn compare_slots(a: &Option<Ranked>, b: &Option<Ranked>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.key_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self { slots: vec![None; k] }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Remplace le pire emplacement si le candidat le bat, puis retrie.
    /// Retourne `true` si le candidat a été retenu.
    pub fn offer(&mut self, number: u16, score: f64) -> bool {
        let candidate = Ranked { number, score };
        let Some(worst) = self.slots.last_mut() else {
            return false;
        };
        let improves = match worst {
            None => true,
            Some(current) => candidate.key_cmp(current) == Ordering::Less,
        };
        if !improves {
            return false;
        }
        *worst = Some(candidate);
        self.slots.sort_by(compare_slots);
        true
    }

    /// Fusion de deux sélections partielles sur des candidats disjoints.
    /// Associative et commutative : le résultat est toujours les K plus
    /// petits de l'union selon (score, numéro).
    pub fn merge(self, other: TopK) -> TopK {
        let k = self.capacity().max(other.capacity());
        let mut all: Vec<Ranked> = self.slots.into_iter().chain(other.slots).flatten().collect();
        all.sort_by(Ranked::key_cmp);
        all.truncate(k);

        let mut slots: Vec<Option<Ranked>> = all.into_iter().map(Some).collect();
        slots.resize(k, None);
        TopK { slots }
    }

    pub fn entries(&self) -> impl Iterator<Item = &Ranked> {
        self.slots.iter().flatten()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn numbers(&self) -> Vec<u16> {
        self.entries().map(|r| r.number).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.entries().map(|r| r.score).collect()
    }
}

/// Parcourt les 10 000 candidats dans l'ordre croissant.
pub fn select_top_k(tables: &FrequencyTables, k: usize) -> TopK {
    let mut top = TopK::new(k);
    for candidate in 0..CODE_SPACE as u16 {
        top.offer(candidate, score(candidate, tables));
    }
    top
}

/// Même résultat que `select_top_k`, calculé par morceaux avec rayon.
pub fn par_select_top_k(tables: &FrequencyTables, k: usize) -> TopK {
    (0..CODE_SPACE as u16)
        .into_par_iter()
        .fold(
            || TopK::new(k),
            |mut top, candidate| {
                top.offer(candidate, score(candidate, tables));
                top
            },
        )
        .reduce(|| TopK::new(k), TopK::merge)
}
