//! Sale-price and margin calculations.
//!
//! All three modes solve the same profit identity for a different unknown:
//!
//! ```text
//! net_profit = sale − cost − sale × tax% − sale × fixed_cost%
//! ```
//!
//! | Mode | Given | Solved |
//! |------|-------|--------|
//! | [`PricingMode::SalePrice`] | sale | net profit and net margin |
//! | [`PricingMode::TargetProfitAmount`] | net profit | sale = (profit + cost) ÷ (1 − tax% − fixed%) |
//! | [`PricingMode::TargetProfitPercent`] | net margin | sale = cost ÷ (1 − tax% − fixed% − margin%) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use icms_core::{PricingMode, resolve_pricing};
//!
//! let result = resolve_pricing(
//!     dec!(100.00),
//!     dec!(18),
//!     dec!(10),
//!     PricingMode::TargetProfitAmount(dec!(44.00)),
//! )
//! .unwrap();
//!
//! assert_eq!(result.sale_price, dec!(200.00));
//! assert_eq!(result.markup_pct, dec!(100.00));
//! assert_eq!(result.break_even_price, dec!(138.89));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{fraction, percent_of, round_half_up};

/// Which quantity the caller fixes; the others are solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum PricingMode {
    /// The sale price itself.
    SalePrice(Decimal),
    /// Net profit per unit, in currency.
    TargetProfitAmount(Decimal),
    /// Net margin over the sale price, in percent units.
    TargetProfitPercent(Decimal),
}

/// Full breakdown of a sale price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub sale_price: Decimal,
    pub cost: Decimal,

    /// Taxes on the sale, in currency and percent of the sale price.
    pub tax_amount: Decimal,
    pub tax_pct: Decimal,

    /// Sale price minus taxes.
    pub net_revenue: Decimal,

    /// Net revenue minus cost, and its share of net revenue.
    pub gross_profit: Decimal,
    pub gross_margin_pct: Decimal,

    /// Fixed costs apportioned to the sale, in currency and percent.
    pub fixed_cost_amount: Decimal,
    pub fixed_cost_pct: Decimal,

    /// What remains after cost, taxes and fixed costs, and its share of the sale price.
    pub net_profit: Decimal,
    pub net_margin_pct: Decimal,

    /// Percentage by which the sale price exceeds cost.
    pub markup_pct: Decimal,

    /// Sale price minus cost and taxes.
    pub contribution_margin: Decimal,

    /// The sale price at which net profit is zero.
    pub break_even_price: Decimal,

    /// Set when the percentages leave no positive sale price; every amount is zero.
    pub impossible: bool,
}

impl PricingResult {
    /// Creates a zero-valued result for percentages that reach 100%.
    fn impossible(
        cost: Decimal,
        tax_pct: Decimal,
        fixed_cost_pct: Decimal,
    ) -> Self {
        Self {
            sale_price: Decimal::ZERO,
            cost,
            tax_amount: Decimal::ZERO,
            tax_pct,
            net_revenue: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_margin_pct: Decimal::ZERO,
            fixed_cost_amount: Decimal::ZERO,
            fixed_cost_pct,
            net_profit: Decimal::ZERO,
            net_margin_pct: Decimal::ZERO,
            markup_pct: Decimal::ZERO,
            contribution_margin: Decimal::ZERO,
            break_even_price: Decimal::ZERO,
            impossible: true,
        }
    }
}

/// Solves for the sale price and derives every pricing metric.
///
/// # Returns
///
/// - `None` when cost is zero or a given sale price is zero (not enough input yet).
/// - A result with `impossible` set when `tax_pct + fixed_cost_pct` reaches
///   100, or, in [`PricingMode::TargetProfitPercent`], when the margin brings
///   the sum to 100. The same applies when a derived amount does not fit in a
///   [`Decimal`].
/// - Otherwise the complete breakdown. The given sale price or profit is kept
///   as received; every derived amount is rounded to cents.
pub fn resolve_pricing(
    cost: Decimal,
    tax_pct: Decimal,
    fixed_cost_pct: Decimal,
    mode: PricingMode,
) -> Option<PricingResult> {
    if cost <= Decimal::ZERO {
        debug!(cost = %cost, "insufficient input for pricing: no cost");
        return None;
    }
    if matches!(mode, PricingMode::SalePrice(sale) if sale.is_zero()) {
        debug!("insufficient input for pricing: no sale price");
        return None;
    }

    let burden_pct = tax_pct.checked_add(fixed_cost_pct);
    let solved_pct = match mode {
        PricingMode::TargetProfitPercent(margin_pct) => {
            burden_pct.and_then(|burden| burden.checked_add(margin_pct))
        }
        PricingMode::SalePrice(_) | PricingMode::TargetProfitAmount(_) => burden_pct,
    };
    let (Some(burden_pct), Some(solved_pct)) = (burden_pct, solved_pct) else {
        warn!(%tax_pct, %fixed_cost_pct, ?mode, "percentages exceed the supported range");
        return Some(PricingResult::impossible(cost, tax_pct, fixed_cost_pct));
    };
    if burden_pct >= Decimal::ONE_HUNDRED || solved_pct >= Decimal::ONE_HUNDRED {
        warn!(
            tax_pct = %tax_pct,
            fixed_cost_pct = %fixed_cost_pct,
            ?mode,
            "combined percentages reach 100%; no sale price is possible"
        );
        return Some(PricingResult::impossible(cost, tax_pct, fixed_cost_pct));
    }

    match solve(cost, tax_pct, fixed_cost_pct, burden_pct, solved_pct, mode) {
        Some(result) => {
            debug!(?mode, ?result, "pricing resolved");
            Some(result)
        }
        None => {
            warn!(
                cost = %cost,
                tax_pct = %tax_pct,
                fixed_cost_pct = %fixed_cost_pct,
                ?mode,
                "pricing amounts exceed the supported range"
            );
            Some(PricingResult::impossible(cost, tax_pct, fixed_cost_pct))
        }
    }
}

/// Solves the sale price for `mode`; `None` when an amount overflows.
///
/// A given sale price or profit is used as received. Only derived amounts are
/// rounded.
fn solve(
    cost: Decimal,
    tax_pct: Decimal,
    fixed_cost_pct: Decimal,
    burden_pct: Decimal,
    solved_pct: Decimal,
    mode: PricingMode,
) -> Option<PricingResult> {
    let retained = Decimal::ONE - fraction(burden_pct);
    let (sale_price, net_profit) = match mode {
        PricingMode::SalePrice(sale) => {
            let net_profit = sale.checked_mul(retained)?.checked_sub(cost)?;
            (sale, round_half_up(net_profit))
        }
        PricingMode::TargetProfitAmount(profit) => {
            let sale = profit.checked_add(cost)?.checked_div(retained)?;
            (round_half_up(sale), profit)
        }
        PricingMode::TargetProfitPercent(margin_pct) => {
            let sale = round_half_up(cost.checked_div(Decimal::ONE - fraction(solved_pct))?);
            (sale, percent_of(sale, margin_pct)?)
        }
    };

    breakdown(cost, tax_pct, fixed_cost_pct, retained, sale_price, net_profit)
}

/// Derives the metrics shared by every mode once the sale price is known.
fn breakdown(
    cost: Decimal,
    tax_pct: Decimal,
    fixed_cost_pct: Decimal,
    retained: Decimal,
    sale_price: Decimal,
    net_profit: Decimal,
) -> Option<PricingResult> {
    let tax_amount = percent_of(sale_price, tax_pct)?;
    let net_revenue = round_half_up(sale_price.checked_sub(tax_amount)?);
    let gross_profit = round_half_up(net_revenue.checked_sub(cost)?);
    let gross_margin_pct = share_pct(gross_profit, net_revenue)?;
    let fixed_cost_amount = percent_of(sale_price, fixed_cost_pct)?;
    let net_margin_pct = share_pct(net_profit, sale_price)?;
    let markup_pct = round_half_up(
        sale_price
            .checked_div(cost)?
            .checked_sub(Decimal::ONE)?
            .checked_mul(Decimal::ONE_HUNDRED)?,
    );
    let contribution_margin = round_half_up(sale_price.checked_sub(cost)?.checked_sub(tax_amount)?);
    let break_even_price = round_half_up(cost.checked_div(retained)?);

    Some(PricingResult {
        sale_price,
        cost,
        tax_amount,
        tax_pct,
        net_revenue,
        gross_profit,
        gross_margin_pct,
        fixed_cost_amount,
        fixed_cost_pct,
        net_profit,
        net_margin_pct,
        markup_pct,
        contribution_margin,
        break_even_price,
        impossible: false,
    })
}

/// `part` as a percentage of `whole`, zero when `whole` is not positive.
fn share_pct(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    if whole <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    part.checked_div(whole)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(round_half_up)
}
