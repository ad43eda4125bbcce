use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field separator of a text export. `Auto` sniffs the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Auto,
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn byte(&self) -> Option<u8> {
        match self {
            Delimiter::Auto => None,
            Delimiter::Comma => Some(b','),
            Delimiter::Semicolon => Some(b';'),
            Delimiter::Tab => Some(b'\t'),
        }
    }

    /// Resolve against a header line. pt-BR spreadsheet exports usually use
    /// `;` because `,` is the decimal mark.
    pub fn resolve(&self, header_line: &str) -> u8 {
        if let Some(b) = self.byte() {
            return b;
        }
        let count = |c: char| header_line.matches(c).count();
        // max_by_key keeps the last maximum, so ties favour ';' over ','
        [(b',', count(',')), (b';', count(';')), (b'\t', count('\t'))]
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .max_by_key(|(_, n)| *n)
            .map(|(b, _)| b)
            .unwrap_or(b',')
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Delimiter::Auto => "auto",
            Delimiter::Comma => "comma",
            Delimiter::Semicolon => "semicolon",
            Delimiter::Tab => "tab",
        };
        f.write_str(s)
    }
}

impl FromStr for Delimiter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Delimiter::Auto),
            "," | "comma" => Ok(Delimiter::Comma),
            ";" | "semicolon" => Ok(Delimiter::Semicolon),
            "\t" | "\\t" | "tab" => Ok(Delimiter::Tab),
            other => anyhow::bail!("unknown delimiter '{other}' (auto, comma, semicolon, tab)"),
        }
    }
}
