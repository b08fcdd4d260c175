use serde::{Deserialize, Serialize};

/// What the buyer does with the goods of an interstate operation.
///
/// Selects both the base-amount formula and the tax formula family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Revenda ou industrialização. Taxed by advance payment (Antecipação).
    Resale,
    /// Uso, consumo ou ativo imobilizado. Taxed by the rate differential (DIFAL).
    Consumption,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resale => "resale",
            Self::Consumption => "consumption",
        }
    }

    /// Accepts the English codes and their Portuguese equivalents, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "resale" | "revenda" | "industrializacao" | "industrialização" => Some(Self::Resale),
            "consumption" | "consumo" | "uso" | "ativo" => Some(Self::Consumption),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Resale => "Revenda/Industrialização",
            Self::Consumption => "Uso, Consumo ou Ativo Imobilizado",
        }
    }

    /// IPI joins the base only when the buyer is the final consumer.
    pub fn includes_excise(&self) -> bool {
        matches!(self, Self::Consumption)
    }
}
