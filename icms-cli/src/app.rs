use std::fmt::Write as _;
use std::path::Path;

use icms_core::locale::{format_brl, format_percent, parse_amount, parse_or_zero};
use icms_core::{
    InterstateRates, OperationInput, OperationOutcome, PricingMode, PricingResult, Purpose,
    RateTable, TaxResult, Uf, evaluate_operation, resolve_pricing,
};
use icms_data::{BatchError, BatchLine, OperationLoader, total_amount_due};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::{BatchArgs, Cli, Command, DifalArgs, PricingArgs};

const INSUFFICIENT_INPUT: &str = "Dados insuficientes para o cálculo.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unrecognised purpose '{0}' (expected resale/revenda or consumption/consumo)")]
    InvalidPurpose(String),

    #[error("unrecognised state code '{0}'")]
    InvalidState(String),

    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Runs the parsed command and returns the report to print.
pub fn run(
    cli: &Cli,
    table: &RateTable,
) -> Result<String, AppError> {
    match &cli.command {
        Command::Difal(args) => difal_report(args, table),
        Command::Pricing(args) => Ok(pricing_report(args)),
        Command::Rates => Ok(rates_report(table)),
        Command::Batch(args) => batch_report(args, table),
    }
}

fn parse_state(code: &str) -> Result<Uf, AppError> {
    Uf::parse(code).ok_or_else(|| AppError::InvalidState(code.to_string()))
}

// ─── difal ───────────────────────────────────────────────────────────────────

pub fn difal_report(
    args: &DifalArgs,
    table: &RateTable,
) -> Result<String, AppError> {
    let purpose =
        Purpose::parse(&args.purpose).ok_or_else(|| AppError::InvalidPurpose(args.purpose.clone()))?;
    let origin = parse_state(&args.origin)?;
    let destination = parse_state(&args.destination)?;

    let inter_rate = match &args.inter_rate {
        Some(rate) => parse_or_zero(rate),
        None => table.interstate_rate(origin, destination, args.imported),
    };
    let dest_rate = match &args.dest_rate {
        Some(rate) => parse_or_zero(rate),
        None => table.rate(destination),
    };

    let input = OperationInput {
        goods: parse_amount(&args.goods),
        freight: parse_amount(&args.freight),
        other_expenses: parse_amount(&args.other),
        excise: parse_amount(&args.ipi),
        purpose,
        rates: InterstateRates {
            inter_rate,
            dest_rate,
            reduction_pct: parse_or_zero(&args.reduction),
        },
    };
    debug!(%origin, %destination, ?input, "evaluating operation");
    let outcome = evaluate_operation(&input);

    let mut out = String::new();
    let _ = writeln!(out, "Operação: {origin} → {destination}");
    let _ = writeln!(out, "Finalidade: {}", purpose.label());
    render_outcome(&mut out, &input, &outcome);
    Ok(out)
}

fn render_outcome(
    out: &mut String,
    input: &OperationInput,
    outcome: &OperationOutcome,
) {
    let rates = &input.rates;
    let _ = writeln!(
        out,
        "Base de cálculo: R$ {} ({})",
        format_brl(outcome.base.amount),
        outcome.base.formula_label
    );
    let _ = writeln!(out, "Alíquota interestadual: {}", format_percent(rates.inter_rate));
    let _ = writeln!(out, "Alíquota interna (destino): {}", format_percent(rates.dest_rate));
    if !rates.reduction_pct.is_zero() {
        let _ = writeln!(out, "Redução da base: {}", format_percent(rates.reduction_pct));
    }

    match &outcome.tax {
        None => {
            let _ = writeln!(out, "{INSUFFICIENT_INPUT}");
        }
        Some(TaxResult::Advance(advance)) => {
            let _ = writeln!(out, "Base origem: R$ {}", format_brl(advance.origin_base));
            let _ = writeln!(out, "Crédito (origem): R$ {}", format_brl(advance.credit));
            let _ = writeln!(out, "Base destino (por dentro): R$ {}", format_brl(advance.dest_base));
            let _ = writeln!(out, "Débito (destino): R$ {}", format_brl(advance.debit));
            let _ = writeln!(out, "ICMS a recolher: R$ {}", format_brl(advance.amount_due));
        }
        Some(TaxResult::Difal(difal)) => {
            if difal.reduced_base != difal.full_base {
                let _ = writeln!(out, "Base reduzida: R$ {}", format_brl(difal.reduced_base));
            }
            if let Some(pct) = difal.differential.checked_mul(Decimal::ONE_HUNDRED) {
                let _ = writeln!(out, "Diferencial de alíquota: {}", format_percent(pct));
            }
            let _ = writeln!(out, "DIFAL a recolher: R$ {}", format_brl(difal.amount_due));
        }
        Some(TaxResult::Error(violation)) => {
            let _ = writeln!(out, "Erro: {violation}");
        }
    }
}

// ─── pricing ─────────────────────────────────────────────────────────────────

fn pricing_mode(args: &PricingArgs) -> PricingMode {
    if let Some(sale) = &args.sale {
        PricingMode::SalePrice(parse_amount(sale))
    } else if let Some(profit) = &args.profit {
        PricingMode::TargetProfitAmount(parse_or_zero(profit))
    } else {
        PricingMode::TargetProfitPercent(args.margin.as_deref().map(parse_or_zero).unwrap_or_default())
    }
}

pub fn pricing_report(args: &PricingArgs) -> String {
    let mode = pricing_mode(args);
    let result = resolve_pricing(
        parse_amount(&args.cost),
        parse_or_zero(&args.tax),
        parse_or_zero(&args.fixed),
        mode,
    );

    match result {
        None => format!("{INSUFFICIENT_INPUT}\n"),
        Some(result) if result.impossible => format!(
            "Preço impossível: impostos ({}) e custos fixos ({}) somados à margem atingem 100%.\n",
            format_percent(result.tax_pct),
            format_percent(result.fixed_cost_pct)
        ),
        Some(result) => render_pricing(&result),
    }
}

fn render_pricing(result: &PricingResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Preço de venda: R$ {}", format_brl(result.sale_price));
    let _ = writeln!(out, "Custo: R$ {}", format_brl(result.cost));
    let _ = writeln!(
        out,
        "Impostos: R$ {} ({})",
        format_brl(result.tax_amount),
        format_percent(result.tax_pct)
    );
    let _ = writeln!(out, "Receita líquida: R$ {}", format_brl(result.net_revenue));
    let _ = writeln!(
        out,
        "Lucro bruto: R$ {} ({})",
        format_brl(result.gross_profit),
        format_percent(result.gross_margin_pct)
    );
    let _ = writeln!(
        out,
        "Custos fixos: R$ {} ({})",
        format_brl(result.fixed_cost_amount),
        format_percent(result.fixed_cost_pct)
    );
    let _ = writeln!(
        out,
        "Lucro líquido: R$ {} ({})",
        format_brl(result.net_profit),
        format_percent(result.net_margin_pct)
    );
    let _ = writeln!(out, "Markup: {}", format_percent(result.markup_pct));
    let _ = writeln!(out, "Margem de contribuição: R$ {}", format_brl(result.contribution_margin));
    let _ = writeln!(out, "Ponto de equilíbrio: R$ {}", format_brl(result.break_even_price));
    out
}

// ─── rates ───────────────────────────────────────────────────────────────────

/// One line per state; configured overrides are marked with `*`.
pub fn rates_report(table: &RateTable) -> String {
    let mut out = String::from("UF  Alíquota interna\n");
    for (uf, rate) in table.entries() {
        let marker = if table.is_overridden(uf) { " *" } else { "" };
        let _ = writeln!(out, "{:<4}{:>8}{marker}", uf.as_str(), format_percent(rate));
    }
    out
}

// ─── batch ───────────────────────────────────────────────────────────────────

pub fn batch_report(
    args: &BatchArgs,
    table: &RateTable,
) -> Result<String, AppError> {
    let lines = evaluate_file(&args.file, table)?;

    let mut out = String::new();
    for line in &lines {
        let status = match &line.outcome.tax {
            None => INSUFFICIENT_INPUT.to_string(),
            Some(TaxResult::Error(violation)) => format!("Erro: {violation}"),
            Some(tax) => format!("R$ {}", format_brl(tax.amount_due().unwrap_or_default())),
        };
        let _ = writeln!(
            out,
            "{:>3}  {:<24} {} → {}  base R$ {:>12}  {status}",
            line.row,
            line.item,
            line.origin,
            line.destination,
            format_brl(line.outcome.base.amount),
        );
    }
    match total_amount_due(&lines) {
        Some(total) => {
            let _ = writeln!(out, "Total a recolher: R$ {}", format_brl(total));
        }
        None => {
            let _ = writeln!(out, "Total a recolher: fora do intervalo suportado");
        }
    }
    Ok(out)
}

fn evaluate_file(
    path: &Path,
    table: &RateTable,
) -> Result<Vec<BatchLine>, AppError> {
    let records = OperationLoader::load_from_file(path)?;
    let lines = OperationLoader::evaluate(&records, table)?;
    info!(rows = lines.len(), "batch evaluated");
    Ok(lines)
}
