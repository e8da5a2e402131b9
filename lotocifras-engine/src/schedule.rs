use chrono::{Days, NaiveDate};

pub const DEFAULT_CEILING: u32 = 5000;
pub const DEFAULT_PADDING_DAYS: u32 = 7;

/// Suite des décalages (en jours) des fenêtres d'observation.
///
/// Récurrence de type Fibonacci amorcée par `before = current = 1` :
/// chaque pas émet `current` puis avance avec `current += before`.
/// La suite s'arrête dès que `current` atteint le plafond.
#[derive(Debug, Clone)]
pub struct LookbackSchedule {
    before: u32,
    current: u32,
    ceiling: u32,
}

impl LookbackSchedule {
    pub fn new(ceiling: u32) -> Self {
        Self {
            before: 1,
            current: 1,
            ceiling,
        }
    }
}

impl Iterator for LookbackSchedule {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.current >= self.ceiling {
            return None;
        }
        let offset = self.current;
        let tmp = self.before;
        self.before = self.current;
        self.current = self.current.saturating_add(tmp);
        Some(offset)
    }
}

/// Nombre de fenêtres parcourues pour un plafond donné.
pub fn iteration_count(ceiling: u32) -> usize {
    LookbackSchedule::new(ceiling).count()
}

/// Date de coupure : `today - (offset + padding)` jours.
pub fn cutoff_date(today: NaiveDate, offset: u32, padding_days: u32) -> NaiveDate {
    let days = u64::from(offset) + u64::from(padding_days);
    today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}
