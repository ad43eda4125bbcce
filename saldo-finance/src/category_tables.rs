//! Static classification tables.
//!
//! Two schemes ship: document type (the one the ledger export carries) and
//! the older account-code chart. Both are plain lookup tables; anything not
//! listed classifies as "Unknown".

use saldo_core::{ClassificationMap, ClassificationScheme, SaldoError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DOCUMENT_TYPE_FIELD: &str = "Document Type";
pub const ACCOUNT_CODE_FIELD: &str = "Conta";

const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("MA", "peças"),
    ("42", "Frota"),
    ("RV", "veículos e notas de software"),
    ("WO", "veículos em que a NF foi cancelada"),
    ("96", "veículos"),
    ("50", "veículos, locação, recarga eletrificação e comissão"),
    ("71", "eletrificação"),
];

/// (account code, ledger description, classification)
const ACCOUNT_CODES: &[(&str, &str, &str)] = &[
    ("301301", "Sale new cars, ngc", "Cars"),
    ("301303", "RecBrVenVeíML-Cancel", "Cars"),
    ("301373", "Sale basic car, ngc", "Cars"),
    ("342901", "Rebates, aftermarket, incurred", "Cars"),
    ("302301", "Sales aftermrkt ngc", "P&A"),
    ("302303", "Canc Sale afterm ngc", "P&A"),
    ("301379", "Sales other, ngc", "P&A"),
    ("301381", "Rec Bruta Serviços Outras", "Comissão"),
    ("301382", "Receita Volvo On Call", "Comissão"),
    ("301383", "Receita Software", "Others"),
    ("301384", "Receita Webshop", "Others"),
    ("362501", "Comissão", "Comissão"),
    ("399903", "Outras Receitas Eletrificação", "Eletrificação"),
    ("391101", "Receita Bruta de Serviços - Aluguel a Executivo", "Locação"),
];

/// Ledger description of an account code, if the chart lists it.
pub fn account_description(code: &str) -> Option<&'static str> {
    let code = code.trim();
    ACCOUNT_CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, desc, _)| *desc)
}

pub fn document_type_map() -> ClassificationMap {
    DOCUMENT_TYPES.iter().copied().collect()
}

pub fn account_code_map() -> ClassificationMap {
    ACCOUNT_CODES
        .iter()
        .map(|(code, _, class)| (*code, *class))
        .collect()
}

/// Which table classifies the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeKind {
    #[default]
    DocumentType,
    AccountCode,
}

impl SchemeKind {
    pub fn key_field(&self) -> &'static str {
        match self {
            SchemeKind::DocumentType => DOCUMENT_TYPE_FIELD,
            SchemeKind::AccountCode => ACCOUNT_CODE_FIELD,
        }
    }

    pub fn scheme(&self) -> ClassificationScheme {
        let map = match self {
            SchemeKind::DocumentType => document_type_map(),
            SchemeKind::AccountCode => account_code_map(),
        };
        ClassificationScheme::new(self.to_string(), self.key_field(), map)
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemeKind::DocumentType => "document-type",
            SchemeKind::AccountCode => "account-code",
        })
    }
}

impl FromStr for SchemeKind {
    type Err = SaldoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "document-type" => Ok(SchemeKind::DocumentType),
            "account-code" => Ok(SchemeKind::AccountCode),
            other => Err(SaldoError::InvalidConfig(format!(
                "unknown classification scheme '{other}' (document-type, account-code)"
            ))),
        }
    }
}
