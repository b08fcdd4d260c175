//! Interstate ICMS and pricing calculators.
//!
//! Every calculation in this crate is a pure function of its inputs. Display
//! strings arrive through [`locale`] and leave through it; nothing here
//! performs I/O.

pub mod calculations;
pub mod locale;
pub mod models;

pub use calculations::{
    AdvanceTaxResult, BaseAmount, DifalResult, InterstateRates, InterstateTax, OperationInput,
    OperationOutcome, PricingMode, PricingResult, TaxResult, TaxRuleViolation, compute_tax,
    evaluate_operation, resolve_base, resolve_pricing,
};
pub use models::*;
