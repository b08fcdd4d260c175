//! One interstate operation, from invoice values to tax due.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Purpose;
use crate::calculations::base_amount::{BaseAmount, resolve_base};
use crate::calculations::interstate::{InterstateRates, InterstateTax, TaxResult};

/// Invoice values and rates of one operation, already parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInput {
    pub goods: Decimal,
    pub freight: Decimal,
    pub other_expenses: Decimal,
    /// IPI charged on the invoice.
    pub excise: Decimal,
    pub purpose: Purpose,
    pub rates: InterstateRates,
}

/// The resolved base and, when there was enough input, the tax result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub base: BaseAmount,
    pub tax: Option<TaxResult>,
}

impl OperationOutcome {
    pub fn amount_due(&self) -> Option<Decimal> {
        self.tax.as_ref().and_then(TaxResult::amount_due)
    }
}

/// Resolves the base of `input` and feeds it to the interstate calculator.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use icms_core::{InterstateRates, OperationInput, Purpose, evaluate_operation};
///
/// let outcome = evaluate_operation(&OperationInput {
///     goods: dec!(2500.00),
///     freight: dec!(150.00),
///     other_expenses: dec!(50.00),
///     excise: dec!(250.00),
///     purpose: Purpose::Consumption,
///     rates: InterstateRates {
///         inter_rate: dec!(7),
///         dest_rate: dec!(20.5),
///         reduction_pct: dec!(0),
///     },
/// });
///
/// assert_eq!(outcome.base.amount, dec!(2950.00));
/// assert_eq!(outcome.amount_due(), Some(dec!(398.25)));
/// ```
pub fn evaluate_operation(input: &OperationInput) -> OperationOutcome {
    let base = resolve_base(
        input.goods,
        input.freight,
        input.other_expenses,
        input.excise,
        input.purpose,
    );
    let tax = InterstateTax::new(input.rates).calculate(base.amount, input.purpose);

    OperationOutcome { base, tax }
}
