use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Nombre de codes possibles (0000-9999).
pub const CODE_SPACE: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct DrawResult {
    /// Date ISO (AAAA-MM-JJ), unique par tirage.
    pub date: String,
    pub digits: [u8; 4],
    pub sign: Sign,
}

impl DrawResult {
    pub fn code(&self) -> u16 {
        code_of(&self.digits)
    }

    pub fn number(&self) -> String {
        format!("{:04}", self.code())
    }
}

/// Signe du zodiaque associé au tirage, stocké sous forme de lettre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Aquarius,
    Pisces,
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Unknown,
}

impl Sign {
    pub const ALL: [Sign; 13] = [
        Sign::Aquarius,
        Sign::Pisces,
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Unknown,
    ];

    pub fn letter(&self) -> char {
        match self {
            Sign::Aquarius => 'A',
            Sign::Pisces => 'B',
            Sign::Aries => 'C',
            Sign::Taurus => 'D',
            Sign::Gemini => 'E',
            Sign::Cancer => 'F',
            Sign::Leo => 'G',
            Sign::Virgo => 'H',
            Sign::Libra => 'I',
            Sign::Scorpio => 'J',
            Sign::Sagittarius => 'K',
            Sign::Capricorn => 'L',
            Sign::Unknown => 'Z',
        }
    }

    pub fn from_letter(letter: char) -> Sign {
        Sign::ALL
            .iter()
            .copied()
            .find(|s| s.letter() == letter.to_ascii_uppercase())
            .unwrap_or(Sign::Unknown)
    }

    /// Nom espagnol tel que publié par la source des résultats (accents et
    /// fautes courantes tolérés). Un nom inconnu donne `Sign::Unknown`.
    pub fn from_name(name: &str) -> Sign {
        let normalized = name.trim().to_lowercase().replace('-', "");
        match normalized.as_str() {
            "acuario" | "acurio" => Sign::Aquarius,
            "piscis" => Sign::Pisces,
            "aries" => Sign::Aries,
            "tauro" => Sign::Taurus,
            "geminis" | "géminis" => Sign::Gemini,
            "cancer" | "cáncer" => Sign::Cancer,
            "leo" => Sign::Leo,
            "virgo" => Sign::Virgo,
            "libra" => Sign::Libra,
            "escorpion" | "escorpio" | "escorpión" => Sign::Scorpio,
            "sagitario" => Sign::Sagittarius,
            "capricornio" => Sign::Capricorn,
            _ => Sign::Unknown,
        }
    }
}

impl std::fmt::Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Sign::Aquarius => "Acuario",
            Sign::Pisces => "Piscis",
            Sign::Aries => "Aries",
            Sign::Taurus => "Tauro",
            Sign::Gemini => "Géminis",
            Sign::Cancer => "Cáncer",
            Sign::Leo => "Leo",
            Sign::Virgo => "Virgo",
            Sign::Libra => "Libra",
            Sign::Scorpio => "Escorpión",
            Sign::Sagittarius => "Sagitario",
            Sign::Capricorn => "Capricornio",
            Sign::Unknown => "—",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    First,
    Second,
    Third,
    Fourth,
}

impl Position {
    pub fn index(&self) -> usize {
        match self {
            Position::First => 0,
            Position::Second => 1,
            Position::Third => 2,
            Position::Fourth => 3,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Position::First => "first",
            Position::Second => "second",
            Position::Third => "third",
            Position::Fourth => "fourth",
        }
    }
}

/// Combinaison de positions utilisée comme clé de regroupement.
///
/// L'ensemble est fermé : les requêtes SQL ne sont construites qu'à partir
/// des noms de colonnes statiques de ces variantes. Les positions sont
/// toujours listées dans l'ordre croissant, et cet ordre fixe aussi l'ordre
/// des chiffres dans l'index de table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    First,
    Second,
    Third,
    Fourth,
    FirstSecond,
    FirstThird,
    FirstFourth,
    SecondThird,
    SecondFourth,
    ThirdFourth,
    FirstSecondThird,
    FirstSecondFourth,
    FirstThirdFourth,
    SecondThirdFourth,
    Complete,
}

impl Grouping {
    pub const COUNT: usize = 15;

    pub const ALL: [Grouping; Grouping::COUNT] = [
        Grouping::First,
        Grouping::Second,
        Grouping::Third,
        Grouping::Fourth,
        Grouping::FirstSecond,
        Grouping::FirstThird,
        Grouping::FirstFourth,
        Grouping::SecondThird,
        Grouping::SecondFourth,
        Grouping::ThirdFourth,
        Grouping::FirstSecondThird,
        Grouping::FirstSecondFourth,
        Grouping::FirstThirdFourth,
        Grouping::SecondThirdFourth,
        Grouping::Complete,
    ];

    pub const SINGLES: [Grouping; 4] = [
        Grouping::First,
        Grouping::Second,
        Grouping::Third,
        Grouping::Fourth,
    ];

    pub const PAIRS: [Grouping; 6] = [
        Grouping::FirstSecond,
        Grouping::FirstThird,
        Grouping::FirstFourth,
        Grouping::SecondThird,
        Grouping::SecondFourth,
        Grouping::ThirdFourth,
    ];

    pub const TRIPLES: [Grouping; 4] = [
        Grouping::FirstSecondThird,
        Grouping::FirstSecondFourth,
        Grouping::FirstThirdFourth,
        Grouping::SecondThirdFourth,
    ];

    pub fn positions(&self) -> &'static [Position] {
        use Position::{First, Fourth, Second, Third};
        match self {
            Grouping::First => &[First],
            Grouping::Second => &[Second],
            Grouping::Third => &[Third],
            Grouping::Fourth => &[Fourth],
            Grouping::FirstSecond => &[First, Second],
            Grouping::FirstThird => &[First, Third],
            Grouping::FirstFourth => &[First, Fourth],
            Grouping::SecondThird => &[Second, Third],
            Grouping::SecondFourth => &[Second, Fourth],
            Grouping::ThirdFourth => &[Third, Fourth],
            Grouping::FirstSecondThird => &[First, Second, Third],
            Grouping::FirstSecondFourth => &[First, Second, Fourth],
            Grouping::FirstThirdFourth => &[First, Third, Fourth],
            Grouping::SecondThirdFourth => &[Second, Third, Fourth],
            Grouping::Complete => &[First, Second, Third, Fourth],
        }
    }

    /// Rang de la variante dans `Grouping::ALL`.
    pub fn slot(&self) -> usize {
        Grouping::ALL
            .iter()
            .position(|g| g == self)
            .unwrap_or_default()
    }

    pub fn arity(&self) -> usize {
        self.positions().len()
    }

    /// Taille de la table de fréquences associée (10^arité).
    pub fn table_len(&self) -> usize {
        10usize.pow(self.arity() as u32)
    }

    pub fn column_list(&self) -> String {
        self.positions()
            .iter()
            .map(|p| p.column())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn label(&self) -> String {
        self.positions()
            .iter()
            .map(|p| p.column())
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Index de cellule pour les chiffres d'un code complet.
    pub fn index_of(&self, digits: &[u8; 4]) -> usize {
        self.positions()
            .iter()
            .fold(0usize, |acc, p| acc * 10 + digits[p.index()] as usize)
    }
}

impl std::fmt::Display for Grouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Nombre d'occurrences d'un n-uplet de chiffres pour un regroupement donné.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedCount {
    /// Chiffres dans l'ordre des positions du regroupement.
    pub values: Vec<u8>,
    pub count: u32,
}

impl GroupedCount {
    pub fn key(&self) -> usize {
        self.values
            .iter()
            .fold(0usize, |acc, &d| acc * 10 + d as usize)
    }
}

/// Décompose un code en 4 chiffres (7 → [0, 0, 0, 7]).
pub fn digits_of(code: u16) -> [u8; 4] {
    [
        (code / 1000 % 10) as u8,
        (code / 100 % 10) as u8,
        (code / 10 % 10) as u8,
        (code % 10) as u8,
    ]
}

pub fn code_of(digits: &[u8; 4]) -> u16 {
    digits
        .iter()
        .fold(0u16, |acc, &d| acc * 10 + d as u16)
}

/// Lit un numéro de 4 caractères (« 0007 »).
pub fn parse_number(raw: &str) -> Result<[u8; 4]> {
    let raw = raw.trim();
    if raw.len() != 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
        bail!("Numéro invalide : '{}' (4 chiffres attendus)", raw);
    }
    let mut digits = [0u8; 4];
    for (i, b) in raw.bytes().enumerate() {
        digits[i] = b - b'0';
    }
    Ok(digits)
}

pub fn validate_result(result: &DrawResult) -> Result<()> {
    NaiveDate::parse_from_str(&result.date, "%Y-%m-%d")
        .with_context(|| format!("Date invalide : '{}'", result.date))?;
    for &d in &result.digits {
        if d > 9 {
            bail!("Chiffre {} hors limites (0-9)", d);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_of_pads_with_zeros() {
        assert_eq!(digits_of(7), [0, 0, 0, 7]);
        assert_eq!(digits_of(9999), [9, 9, 9, 9]);
        assert_eq!(digits_of(1203), [1, 2, 0, 3]);
        assert_eq!(code_of(&[0, 0, 0, 7]), 7);
        assert_eq!(code_of(&digits_of(4821)), 4821);
    }

    #[test]
    fn test_grouping_tables_cover_candidate_space() {
        assert_eq!(Grouping::ALL.len(), Grouping::COUNT);
        for g in Grouping::SINGLES {
            assert_eq!(g.table_len(), 10);
        }
        for g in Grouping::PAIRS {
            assert_eq!(g.table_len(), 100);
        }
        for g in Grouping::TRIPLES {
            assert_eq!(g.table_len(), 1000);
        }
        assert_eq!(Grouping::Complete.table_len(), CODE_SPACE);
    }

    #[test]
    fn test_grouping_slots_are_distinct() {
        for (i, g) in Grouping::ALL.iter().enumerate() {
            assert_eq!(g.slot(), i);
        }
    }

    #[test]
    fn test_grouping_index_follows_position_order() {
        let digits = [7, 1, 2, 3];
        assert_eq!(Grouping::First.index_of(&digits), 7);
        assert_eq!(Grouping::Fourth.index_of(&digits), 3);
        assert_eq!(Grouping::FirstThird.index_of(&digits), 72);
        assert_eq!(Grouping::SecondFourth.index_of(&digits), 13);
        assert_eq!(Grouping::FirstThirdFourth.index_of(&digits), 723);
        assert_eq!(Grouping::SecondThirdFourth.index_of(&digits), 123);
        assert_eq!(Grouping::Complete.index_of(&digits), 7123);
    }

    #[test]
    fn test_grouping_columns() {
        assert_eq!(Grouping::FirstFourth.column_list(), "first, fourth");
        assert_eq!(Grouping::Complete.label(), "first+second+third+fourth");
    }

    #[test]
    fn test_grouped_count_key() {
        let gc = GroupedCount { values: vec![0, 4, 2], count: 3 };
        assert_eq!(gc.key(), 42);
    }

    #[test]
    fn test_sign_from_name() {
        assert_eq!(Sign::from_name("Acurio"), Sign::Aquarius);
        assert_eq!(Sign::from_name("géminis"), Sign::Gemini);
        assert_eq!(Sign::from_name("ESCORPIÓN"), Sign::Scorpio);
        assert_eq!(Sign::from_name("sagi-tario"), Sign::Sagittarius);
        assert_eq!(Sign::from_name("ophiuchus"), Sign::Unknown);
    }

    #[test]
    fn test_sign_letter_roundtrip() {
        for s in Sign::ALL {
            assert_eq!(Sign::from_letter(s.letter()), s);
        }
        assert_eq!(Sign::from_letter('?'), Sign::Unknown);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0007").unwrap(), [0, 0, 0, 7]);
        assert_eq!(parse_number(" 4821 ").unwrap(), [4, 8, 2, 1]);
        assert!(parse_number("123").is_err());
        assert!(parse_number("12a4").is_err());
        assert!(parse_number("12345").is_err());
    }

    #[test]
    fn test_validate_result() {
        let ok = DrawResult { date: "2024-02-29".into(), digits: [1, 2, 3, 4], sign: Sign::Leo };
        assert!(validate_result(&ok).is_ok());

        let bad_date = DrawResult { date: "2023-02-29".into(), ..ok.clone() };
        assert!(validate_result(&bad_date).is_err());

        let bad_digit = DrawResult { digits: [1, 2, 10, 4], ..ok };
        assert!(validate_result(&bad_digit).is_err());
    }
}
