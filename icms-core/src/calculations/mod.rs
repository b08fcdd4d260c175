//! ICMS and pricing calculators.
//!
//! This module provides the computation engine: taxable-base resolution,
//! interstate ICMS (Antecipação and DIFAL), and sale-price resolution.

pub mod base_amount;
pub mod common;
pub mod interstate;
pub mod operation;
pub mod pricing;

pub use base_amount::{BaseAmount, resolve_base};
pub use interstate::{
    AdvanceTaxResult, DifalResult, InterstateRates, InterstateTax, TaxResult, TaxRuleViolation,
    compute_tax,
};
pub use operation::{OperationInput, OperationOutcome, evaluate_operation};
pub use pricing::{PricingMode, PricingResult, resolve_pricing};
