//! Monetary text normalization.
//!
//! Turns pt-BR style amounts ("R$ 1.234,56", "8.698,71", "-200,50") into
//! `f64`. Normalization is total: blanks, garbage and overflow all map to
//! `0.0`, never to an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::dataset::Cell;
use crate::error::SaldoError;

static CURRENCY_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)R\$|BRL").expect("currency token pattern is valid"));

/// How `.` and `,` are told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeparatorHeuristic {
    /// Both present: `.` groups thousands, `,` is the decimal mark.
    /// A single lone `,` is the decimal mark. Anything else is left alone,
    /// so `"8698.71"` stays a decimal and `"1.234.567"` fails to parse.
    #[default]
    CommaDecimal,
    /// Every `.` groups thousands and every `,` is the decimal mark.
    /// `"8698.71"` becomes `869871`.
    DotThousands,
}

impl SeparatorHeuristic {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeparatorHeuristic::CommaDecimal => "comma-decimal",
            SeparatorHeuristic::DotThousands => "dot-thousands",
        }
    }

    fn apply(&self, s: &str) -> String {
        match self {
            SeparatorHeuristic::CommaDecimal => {
                let commas = s.matches(',').count();
                let dots = s.matches('.').count();
                if commas >= 1 && dots >= 1 {
                    s.replace('.', "").replace(',', ".")
                } else if commas == 1 {
                    s.replace(',', ".")
                } else {
                    s.to_string()
                }
            }
            SeparatorHeuristic::DotThousands => s.replace('.', "").replace(',', "."),
        }
    }
}

impl fmt::Display for SeparatorHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeparatorHeuristic {
    type Err = SaldoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comma-decimal" => Ok(SeparatorHeuristic::CommaDecimal),
            "dot-thousands" => Ok(SeparatorHeuristic::DotThousands),
            other => Err(SaldoError::InvalidConfig(format!(
                "unknown separator heuristic '{other}' (expected comma-decimal or dot-thousands)"
            ))),
        }
    }
}

/// Converts raw monetary values into numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmountNormalizer {
    heuristic: SeparatorHeuristic,
}

impl AmountNormalizer {
    pub fn new(heuristic: SeparatorHeuristic) -> Self {
        Self { heuristic }
    }

    pub fn heuristic(&self) -> SeparatorHeuristic {
        self.heuristic
    }

    /// Normalize a single cell. Finite numbers pass through unchanged.
    pub fn normalize(&self, cell: &Cell) -> f64 {
        match cell {
            Cell::Number(n) if n.is_finite() => *n,
            Cell::Text(s) => self.normalize_str(s),
            _ => 0.0,
        }
    }

    /// Normalize monetary text. Always returns a finite value.
    pub fn normalize_str(&self, raw: &str) -> f64 {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return 0.0;
        }

        let without_currency = CURRENCY_TOKENS.replace_all(&compact, "");
        let separated = self.heuristic.apply(&without_currency);

        let cleaned: String = separated
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();

        if matches!(cleaned.as_str(), "" | "." | "-") {
            return 0.0;
        }

        cleaned
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .unwrap_or(0.0)
    }
}

/// Normalize with the default (`CommaDecimal`) heuristic.
pub fn parse_amount(raw: &str) -> f64 {
    AmountNormalizer::default().normalize_str(raw)
}
