//! Regression vectors and grid-checked properties of the calculators.
//!
//! The unit tests next to each calculator pin individual lines; these tests
//! exercise the public API end-to-end over fixed input grids.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use icms_core::locale::parse_or_zero;
use icms_core::{
    AdvanceTaxResult, DifalResult, PricingMode, Purpose, TaxResult, TaxRuleViolation, Uf, compute_tax,
    default_internal_rate, interstate_rate, resolve_base, resolve_pricing,
};

const BASES: [Decimal; 5] = [dec!(0.01), dec!(99.99), dec!(1000), dec!(1234.56), dec!(87654.32)];
const INTER_RATES: [Decimal; 3] = [dec!(4), dec!(7), dec!(12)];
const DEST_RATES: [Decimal; 5] = [dec!(12.5), dec!(17), dec!(18), dec!(20.5), dec!(22)];
const REDUCTIONS: [Decimal; 3] = [dec!(0), dec!(33.33), dec!(58.82)];

#[test]
fn canonical_advance_tax_vector() {
    let result = compute_tax(dec!(1000), dec!(12), dec!(18), dec!(0), Purpose::Resale);

    assert_eq!(
        result,
        Some(TaxResult::Advance(AdvanceTaxResult {
            origin_base: dec!(1000.00),
            credit: dec!(120.00),
            dest_base: dec!(1073.17),
            debit: dec!(193.17),
            amount_due: dec!(73.17),
        }))
    );
}

#[test]
fn canonical_difal_vector() {
    let result = compute_tax(dec!(1000), dec!(12), dec!(18), dec!(0), Purpose::Consumption);

    assert_eq!(
        result,
        Some(TaxResult::Difal(DifalResult {
            full_base: dec!(1000),
            reduced_base: dec!(1000.00),
            differential: dec!(0.06),
            amount_due: dec!(60.00),
        }))
    );
}

#[test]
fn excise_only_joins_consumption_base() {
    assert_eq!(
        resolve_base(dec!(100), dec!(0), dec!(0), dec!(20), Purpose::Consumption).amount,
        dec!(120.00)
    );
    assert_eq!(
        resolve_base(dec!(100), dec!(0), dec!(0), dec!(20), Purpose::Resale).amount,
        dec!(100.00)
    );
}

#[test]
fn advance_amount_due_is_exactly_debit_minus_credit() {
    for base in BASES {
        for inter_rate in INTER_RATES {
            for dest_rate in DEST_RATES {
                for reduction in REDUCTIONS {
                    let result = compute_tax(base, inter_rate, dest_rate, reduction, Purpose::Resale);

                    let Some(TaxResult::Advance(advance)) = result else {
                        panic!("expected advance result for {base} {inter_rate} {dest_rate} {reduction}");
                    };
                    assert_eq!(advance.amount_due, advance.debit - advance.credit);
                }
            }
        }
    }
}

#[test]
fn every_intermediate_amount_has_at_most_two_decimals() {
    for base in BASES {
        for dest_rate in DEST_RATES {
            let Some(TaxResult::Advance(advance)) =
                compute_tax(base, dec!(7), dest_rate, dec!(33.33), Purpose::Resale)
            else {
                panic!("expected advance result");
            };

            for amount in [
                advance.origin_base,
                advance.credit,
                advance.dest_base,
                advance.debit,
                advance.amount_due,
            ] {
                assert!(amount.normalize().scale() <= 2, "{amount} has more than 2 decimals");
            }
        }
    }
}

#[test]
fn equal_rates_never_succeed() {
    for base in BASES {
        for rate in DEST_RATES {
            for purpose in [Purpose::Resale, Purpose::Consumption] {
                let result = compute_tax(base, rate, rate, dec!(0), purpose)
                    .expect("complete input must produce a result");

                assert!(result.is_error(), "{base} at {rate}% should be rejected");
            }
        }
    }
}

#[test]
fn target_profit_round_trips_through_sale_price() {
    let costs = [dec!(37.45), dec!(100), dec!(1234.56)];
    let tax_pcts = [dec!(7), dec!(12.5), dec!(18)];
    let fixed_pcts = [dec!(0), dec!(5.5), dec!(20)];
    let profits = [dec!(0), dec!(9.99), dec!(250)];

    for cost in costs {
        for tax_pct in tax_pcts {
            for fixed_pct in fixed_pcts {
                for profit in profits {
                    let forward = resolve_pricing(
                        cost,
                        tax_pct,
                        fixed_pct,
                        PricingMode::TargetProfitAmount(profit),
                    )
                    .expect("cost is positive");
                    let back = resolve_pricing(
                        cost,
                        tax_pct,
                        fixed_pct,
                        PricingMode::SalePrice(forward.sale_price),
                    )
                    .expect("sale price is positive");

                    let drift = (back.net_profit - profit).abs();
                    assert!(
                        drift <= dec!(0.01),
                        "cost {cost} tax {tax_pct} fixed {fixed_pct}: {profit} came back as {}",
                        back.net_profit
                    );
                }
            }
        }
    }
}

#[test]
fn burden_at_or_above_one_hundred_is_always_impossible() {
    let burdens = [(dec!(50), dec!(50)), (dec!(99.99), dec!(0.01)), (dec!(80), dec!(45))];

    for cost in [dec!(0.01), dec!(100), dec!(5000)] {
        for (tax_pct, fixed_pct) in burdens {
            for mode in [
                PricingMode::SalePrice(dec!(150)),
                PricingMode::TargetProfitAmount(dec!(20)),
                PricingMode::TargetProfitPercent(dec!(10)),
            ] {
                let result = resolve_pricing(cost, tax_pct, fixed_pct, mode)
                    .expect("positive cost always yields a result");

                assert!(result.impossible);
            }
        }
    }
}

#[test]
fn percentages_approaching_one_hundred_never_panic() {
    let near_hundred = [
        dec!(99.99),
        dec!(99.9999999999),
        dec!(99.99999999999999999999),
        dec!(99.99999999999999999999999999),
    ];

    for cost in [dec!(0.01), dec!(100), dec!(1000000000000000000000)] {
        for margin_pct in near_hundred {
            let result =
                resolve_pricing(cost, dec!(0), dec!(0), PricingMode::TargetProfitPercent(margin_pct))
                    .expect("positive cost always yields a result");

            assert!(
                result.impossible || result.sale_price > cost,
                "cost {cost} margin {margin_pct}: {result:?}"
            );
        }
        for burden_pct in near_hundred {
            let result =
                resolve_pricing(cost, burden_pct, dec!(0), PricingMode::TargetProfitAmount(dec!(1)))
                    .expect("positive cost always yields a result");

            assert!(
                result.impossible || result.break_even_price > cost,
                "cost {cost} tax {burden_pct}: {result:?}"
            );
        }
    }
}

#[test]
fn large_bases_with_high_destination_rates_never_panic() {
    let bases = [dec!(1000000000000), dec!(1000000000000000000000000000), Decimal::MAX];
    let dest_rates = [dec!(22), dec!(99.99), dec!(99.9999999999)];

    for base in bases {
        for dest_rate in dest_rates {
            for purpose in [Purpose::Resale, Purpose::Consumption] {
                let result = compute_tax(base, dec!(12), dest_rate, dec!(0), purpose)
                    .expect("complete input must produce a result");

                match result {
                    TaxResult::Advance(advance) => {
                        assert_eq!(advance.amount_due, advance.debit - advance.credit)
                    }
                    TaxResult::Difal(difal) => assert!(difal.amount_due > Decimal::ZERO),
                    TaxResult::Error(violation) => {
                        assert_eq!(violation, TaxRuleViolation::Overflow, "{base} at {dest_rate}%")
                    }
                }
            }
        }
    }
}

#[test]
fn form_strings_feed_the_engine() {
    let base = resolve_base(
        parse_or_zero("2.500,00"),
        parse_or_zero("150,00"),
        parse_or_zero(""),
        parse_or_zero("R$ 250,00"),
        Purpose::Consumption,
    );
    let inter_rate = interstate_rate(Uf::Sp, Uf::Ba, false);
    let dest_rate = default_internal_rate(Uf::Ba);

    let result = compute_tax(base.amount, inter_rate, dest_rate, parse_or_zero(""), Purpose::Consumption);

    // (2900.00) × (20.5% − 7%) = 391.50
    assert_eq!(base.amount, dec!(2900.00));
    assert_eq!(result.and_then(|r| r.amount_due()), Some(dec!(391.50)));
}
