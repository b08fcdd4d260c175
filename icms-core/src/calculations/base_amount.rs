//! Taxable base of an interstate operation.
//!
//! The base is the sum of the commercial values on the invoice. IPI (federal
//! excise tax) is part of the base only when the buyer is the final consumer:
//! a reseller recovers it further down the chain.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use icms_core::{Purpose, resolve_base};
//!
//! let base = resolve_base(dec!(100), dec!(0), dec!(0), dec!(20), Purpose::Consumption);
//! assert_eq!(base.amount, dec!(120.00));
//!
//! let base = resolve_base(dec!(100), dec!(0), dec!(0), dec!(20), Purpose::Resale);
//! assert_eq!(base.amount, dec!(100.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Purpose;
use crate::calculations::common::round_half_up;

const RESALE_FORMULA: &str = "Produtos + Frete + Outras Despesas";
const CONSUMPTION_FORMULA: &str = "Produtos + Frete + Outras Despesas + IPI";

/// A resolved taxable base together with the formula that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAmount {
    /// Taxable base, rounded to cents.
    pub amount: Decimal,

    /// Names of the summed components, for display next to the amount.
    pub formula_label: String,
}

/// Derives the taxable base from the invoice values.
///
/// Inputs that could not be parsed are expected to arrive as zero; this
/// function never rejects input. A sum that does not fit in a [`Decimal`] is
/// reported as a zero base, which the calculators treat as missing input.
pub fn resolve_base(
    goods: Decimal,
    freight: Decimal,
    other_expenses: Decimal,
    excise: Decimal,
    purpose: Purpose,
) -> BaseAmount {
    let (components, formula_label) = if purpose.includes_excise() {
        ([goods, freight, other_expenses, excise], CONSUMPTION_FORMULA)
    } else {
        ([goods, freight, other_expenses, Decimal::ZERO], RESALE_FORMULA)
    };

    let amount = components
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .map(round_half_up)
        .unwrap_or_else(|| {
            warn!(
                goods = %goods,
                freight = %freight,
                other_expenses = %other_expenses,
                excise = %excise,
                "taxable base exceeds the supported range"
            );
            Decimal::ZERO
        });

    BaseAmount {
        amount,
        formula_label: formula_label.to_string(),
    }
}
