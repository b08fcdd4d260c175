//! Interstate ICMS calculations: Antecipação and DIFAL.
//!
//! An interstate purchase is taxed at the origin by the interstate rate. The
//! destination state then collects the difference to its own internal rate,
//! in one of two ways depending on what the buyer does with the goods.
//!
//! # Antecipação (resale)
//!
//! The tax is computed "por dentro": the destination base is grossed up so
//! that, once taxed at the destination rate, it reproduces a debit that nets
//! out the interstate credit.
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Origin base: base × (1 − reduction) |
//! | 2    | Credit: origin base × interstate rate |
//! | 3    | Destination base: (origin base − credit) ÷ (1 − destination rate) |
//! | 4    | Debit: destination base × destination rate |
//! | 5    | Amount due: debit − credit |
//!
//! # DIFAL (use, consumption or fixed assets)
//!
//! The tax is computed "por fora": the reduced base is multiplied by the
//! difference between the two rates.
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Reduced base: base × (1 − reduction) |
//! | 2    | Differential: destination rate − interstate rate |
//! | 3    | Amount due: reduced base × differential |
//!
//! Every monetary quantity is rounded to cents as soon as it is computed.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use icms_core::{Purpose, TaxResult, compute_tax};
//!
//! let result = compute_tax(dec!(1000), dec!(12), dec!(18), dec!(0), Purpose::Resale);
//!
//! let Some(TaxResult::Advance(advance)) = result else {
//!     panic!("expected an advance-tax result");
//! };
//! assert_eq!(advance.dest_base, dec!(1073.17));
//! assert_eq!(advance.amount_due, dec!(73.17));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Purpose;
use crate::calculations::common::{fraction, percent_of, round_half_up};

/// Business-rule violations detected while computing interstate ICMS.
///
/// These are returned inside [`TaxResult::Error`] rather than as an `Err`,
/// so a caller can render them inline next to the other result shapes.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxRuleViolation {
    /// The destination rate is not strictly greater than the interstate rate.
    #[error("destination rate must exceed interstate rate")]
    RateOrder {
        inter_rate: Decimal,
        dest_rate: Decimal,
    },

    /// The destination rate leaves no room for the gross-up divisor.
    #[error("invalid destination rate")]
    DegenerateDivisor(Decimal),

    /// The base reduction is outside the 0 to 100 percent range.
    #[error("base reduction must be between 0 and 100 percent")]
    InvalidReduction(Decimal),

    /// An intermediate amount does not fit in a [`Decimal`].
    #[error("amounts exceed the supported range")]
    Overflow,
}

/// Rates applied to one interstate operation, in percent units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterstateRates {
    /// Interstate ICMS rate charged by the origin state (4, 7 or 12).
    pub inter_rate: Decimal,

    /// Internal ICMS rate of the destination state.
    pub dest_rate: Decimal,

    /// Reduction applied to the base before any rate, e.g. `33.33`.
    pub reduction_pct: Decimal,
}

impl InterstateRates {
    /// Returns `true` when any required rate is still zero.
    pub fn is_incomplete(&self) -> bool {
        self.inter_rate.is_zero() || self.dest_rate.is_zero()
    }

    /// Validates the rates against the business rules shared by both branches.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRuleViolation`] if:
    /// - `dest_rate` is not greater than `inter_rate`
    /// - `reduction_pct` is not in [0, 100]
    pub fn validate(&self) -> Result<(), TaxRuleViolation> {
        if self.dest_rate <= self.inter_rate {
            return Err(TaxRuleViolation::RateOrder {
                inter_rate: self.inter_rate,
                dest_rate: self.dest_rate,
            });
        }
        if self.reduction_pct < Decimal::ZERO || self.reduction_pct > Decimal::ONE_HUNDRED {
            return Err(TaxRuleViolation::InvalidReduction(self.reduction_pct));
        }
        Ok(())
    }
}

/// Result of the Antecipação (advance tax) calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTaxResult {
    /// Base after the reduction, taxed at the interstate rate.
    pub origin_base: Decimal,

    /// ICMS already charged by the origin state.
    pub credit: Decimal,

    /// Grossed-up base taxed at the destination rate.
    pub dest_base: Decimal,

    /// ICMS owed at the destination rate.
    pub debit: Decimal,

    /// Debit minus credit.
    pub amount_due: Decimal,
}

/// Result of the DIFAL (rate differential) calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifalResult {
    /// Base as received, before the reduction.
    pub full_base: Decimal,

    /// Base after the reduction.
    pub reduced_base: Decimal,

    /// Difference between the rates, as a fraction (`0.06` for 18% − 12%).
    pub differential: Decimal,

    /// Reduced base times the differential.
    pub amount_due: Decimal,
}

/// Outcome of an interstate calculation that had enough input to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TaxResult {
    Advance(AdvanceTaxResult),
    Difal(DifalResult),
    Error(TaxRuleViolation),
}

impl TaxResult {
    /// Tax owed to the destination state, or `None` for an error.
    pub fn amount_due(&self) -> Option<Decimal> {
        match self {
            Self::Advance(advance) => Some(advance.amount_due),
            Self::Difal(difal) => Some(difal.amount_due),
            Self::Error(_) => None,
        }
    }

    pub fn violation(&self) -> Option<&TaxRuleViolation> {
        match self {
            Self::Error(violation) => Some(violation),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Calculator for interstate ICMS owed to the destination state.
#[derive(Debug, Clone)]
pub struct InterstateTax {
    rates: InterstateRates,
}

impl InterstateTax {
    pub fn new(rates: InterstateRates) -> Self {
        Self { rates }
    }

    /// Computes the tax for `base` using the formula family selected by `purpose`.
    ///
    /// # Returns
    ///
    /// - `None` when the base or either rate is still zero (not enough input yet).
    /// - `Some(TaxResult::Error(_))` when the rates break a business rule.
    /// - `Some(TaxResult::Advance(_))` for [`Purpose::Resale`].
    /// - `Some(TaxResult::Difal(_))` for [`Purpose::Consumption`].
    pub fn calculate(
        &self,
        base: Decimal,
        purpose: Purpose,
    ) -> Option<TaxResult> {
        if base.is_zero() || self.rates.is_incomplete() {
            debug!(
                base = %base,
                inter_rate = %self.rates.inter_rate,
                dest_rate = %self.rates.dest_rate,
                "insufficient input for interstate calculation"
            );
            return None;
        }

        if let Err(violation) = self.rates.validate() {
            warn!(
                inter_rate = %self.rates.inter_rate,
                dest_rate = %self.rates.dest_rate,
                reduction_pct = %self.rates.reduction_pct,
                %violation,
                "interstate rates rejected"
            );
            return Some(TaxResult::Error(violation));
        }

        let result = match purpose {
            Purpose::Resale => self.advance_tax(base).map(TaxResult::Advance),
            Purpose::Consumption => self.difal(base).map(TaxResult::Difal),
        };
        let result = result.unwrap_or_else(|violation| {
            warn!(
                base = %base,
                dest_rate = %self.rates.dest_rate,
                %violation,
                "interstate calculation rejected"
            );
            TaxResult::Error(violation)
        });
        debug!(purpose = purpose.as_str(), ?result, "interstate calculation complete");
        Some(result)
    }

    /// Applies the base reduction, shared by both branches.
    fn reduced_base(
        &self,
        base: Decimal,
    ) -> Result<Decimal, TaxRuleViolation> {
        base.checked_mul(Decimal::ONE - fraction(self.rates.reduction_pct))
            .map(round_half_up)
            .ok_or(TaxRuleViolation::Overflow)
    }

    /// Gross-up ("por dentro") calculation for goods bought for resale.
    fn advance_tax(
        &self,
        base: Decimal,
    ) -> Result<AdvanceTaxResult, TaxRuleViolation> {
        let origin_base = self.reduced_base(base)?;
        let credit =
            percent_of(origin_base, self.rates.inter_rate).ok_or(TaxRuleViolation::Overflow)?;

        let divisor = Decimal::ONE - fraction(self.rates.dest_rate);
        if divisor <= Decimal::ZERO {
            return Err(TaxRuleViolation::DegenerateDivisor(self.rates.dest_rate));
        }

        let dest_base = origin_base
            .checked_sub(credit)
            .and_then(|net| net.checked_div(divisor))
            .map(round_half_up)
            .ok_or(TaxRuleViolation::Overflow)?;
        let debit = percent_of(dest_base, self.rates.dest_rate).ok_or(TaxRuleViolation::Overflow)?;
        let amount_due = debit
            .checked_sub(credit)
            .map(round_half_up)
            .ok_or(TaxRuleViolation::Overflow)?;

        Ok(AdvanceTaxResult {
            origin_base,
            credit,
            dest_base,
            debit,
            amount_due,
        })
    }

    /// Rate-differential ("por fora") calculation for use and consumption.
    fn difal(
        &self,
        base: Decimal,
    ) -> Result<DifalResult, TaxRuleViolation> {
        let reduced_base = self.reduced_base(base)?;
        let differential = self
            .rates
            .dest_rate
            .checked_sub(self.rates.inter_rate)
            .map(fraction)
            .ok_or(TaxRuleViolation::Overflow)?;
        let amount_due = reduced_base
            .checked_mul(differential)
            .map(round_half_up)
            .ok_or(TaxRuleViolation::Overflow)?;

        Ok(DifalResult {
            full_base: base,
            reduced_base,
            differential,
            amount_due,
        })
    }
}

/// Computes interstate ICMS for one operation.
///
/// Shorthand for building an [`InterstateTax`] and calling
/// [`InterstateTax::calculate`].
pub fn compute_tax(
    base: Decimal,
    inter_rate: Decimal,
    dest_rate: Decimal,
    reduction_pct: Decimal,
    purpose: Purpose,
) -> Option<TaxResult> {
    InterstateTax::new(InterstateRates {
        inter_rate,
        dest_rate,
        reduction_pct,
    })
    .calculate(base, purpose)
}
