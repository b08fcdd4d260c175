//! Brazilian federative units and their default ICMS rates.
//!
//! The rate table is a convenience default for the destination rate of an
//! operation. Callers may always override it, either per operation or through
//! a [`RateTable`] carrying configured overrides.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Geographic region of a federative unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    North,
    Northeast,
    CenterWest,
    Southeast,
    South,
}

/// One of the 27 Brazilian federative units (26 states plus the Federal District).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Uf {
    Ac,
    Al,
    Ap,
    Am,
    Ba,
    Ce,
    Df,
    Es,
    Go,
    Ma,
    Mt,
    Ms,
    Mg,
    Pa,
    Pb,
    Pr,
    Pe,
    Pi,
    Rj,
    Rn,
    Rs,
    Ro,
    Rr,
    Sc,
    Sp,
    Se,
    To,
}

impl Uf {
    pub const ALL: [Uf; 27] = [
        Uf::Ac,
        Uf::Al,
        Uf::Ap,
        Uf::Am,
        Uf::Ba,
        Uf::Ce,
        Uf::Df,
        Uf::Es,
        Uf::Go,
        Uf::Ma,
        Uf::Mt,
        Uf::Ms,
        Uf::Mg,
        Uf::Pa,
        Uf::Pb,
        Uf::Pr,
        Uf::Pe,
        Uf::Pi,
        Uf::Rj,
        Uf::Rn,
        Uf::Rs,
        Uf::Ro,
        Uf::Rr,
        Uf::Sc,
        Uf::Sp,
        Uf::Se,
        Uf::To,
    ];

    /// Two-letter uppercase code, as printed on fiscal documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ac => "AC",
            Self::Al => "AL",
            Self::Ap => "AP",
            Self::Am => "AM",
            Self::Ba => "BA",
            Self::Ce => "CE",
            Self::Df => "DF",
            Self::Es => "ES",
            Self::Go => "GO",
            Self::Ma => "MA",
            Self::Mt => "MT",
            Self::Ms => "MS",
            Self::Mg => "MG",
            Self::Pa => "PA",
            Self::Pb => "PB",
            Self::Pr => "PR",
            Self::Pe => "PE",
            Self::Pi => "PI",
            Self::Rj => "RJ",
            Self::Rn => "RN",
            Self::Rs => "RS",
            Self::Ro => "RO",
            Self::Rr => "RR",
            Self::Sc => "SC",
            Self::Sp => "SP",
            Self::Se => "SE",
            Self::To => "TO",
        }
    }

    /// Parses a two-letter code, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|uf| uf.as_str() == code)
    }

    pub fn region(&self) -> Region {
        match self {
            Self::Ac | Self::Am | Self::Ap | Self::Pa | Self::Ro | Self::Rr | Self::To => {
                Region::North
            }
            Self::Al
            | Self::Ba
            | Self::Ce
            | Self::Ma
            | Self::Pb
            | Self::Pe
            | Self::Pi
            | Self::Rn
            | Self::Se => Region::Northeast,
            Self::Df | Self::Go | Self::Ms | Self::Mt => Region::CenterWest,
            Self::Es | Self::Mg | Self::Rj | Self::Sp => Region::Southeast,
            Self::Pr | Self::Rs | Self::Sc => Region::South,
        }
    }
}

impl fmt::Display for Uf {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default internal ICMS rate of each federative unit, in percent units.
/// Rates include the state poverty-fund surcharge where one applies.
pub const DEFAULT_INTERNAL_RATES: [(Uf, Decimal); 27] = [
    (Uf::Ac, dec!(19)),
    (Uf::Al, dec!(19)),
    (Uf::Ap, dec!(18)),
    (Uf::Am, dec!(20)),
    (Uf::Ba, dec!(20.5)),
    (Uf::Ce, dec!(20)),
    (Uf::Df, dec!(20)),
    (Uf::Es, dec!(17)),
    (Uf::Go, dec!(19)),
    (Uf::Ma, dec!(22)),
    (Uf::Mt, dec!(17)),
    (Uf::Ms, dec!(17)),
    (Uf::Mg, dec!(18)),
    (Uf::Pa, dec!(19)),
    (Uf::Pb, dec!(20)),
    (Uf::Pr, dec!(19.5)),
    (Uf::Pe, dec!(20.5)),
    (Uf::Pi, dec!(21)),
    (Uf::Rj, dec!(22)),
    (Uf::Rn, dec!(18)),
    (Uf::Rs, dec!(17)),
    (Uf::Ro, dec!(19.5)),
    (Uf::Rr, dec!(20)),
    (Uf::Sc, dec!(17)),
    (Uf::Sp, dec!(18)),
    (Uf::Se, dec!(19)),
    (Uf::To, dec!(20)),
];

/// Interstate rate for goods with more than 40% imported content.
pub const IMPORTED_INTERSTATE_RATE: Decimal = dec!(4);
/// Interstate rate from the South/Southeast (except ES) to the other regions and ES.
pub const REDUCED_INTERSTATE_RATE: Decimal = dec!(7);
/// Interstate rate for every other origin/destination pair.
pub const STANDARD_INTERSTATE_RATE: Decimal = dec!(12);

/// Looks up the default internal rate of `uf` in [`DEFAULT_INTERNAL_RATES`].
pub fn default_internal_rate(uf: Uf) -> Decimal {
    DEFAULT_INTERNAL_RATES
        .iter()
        .find(|(entry, _)| *entry == uf)
        .map(|(_, rate)| *rate)
        .unwrap_or(Decimal::ZERO)
}

/// Interstate ICMS rate for an operation from `origin` to `destination`.
///
/// An operation inside a single state has no interstate rate; the origin's
/// internal rate is returned so that the differential comes out as zero and
/// the tax engine reports the rate-ordering violation.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use icms_core::models::{Uf, interstate_rate};
///
/// assert_eq!(interstate_rate(Uf::Sp, Uf::Ba, false), dec!(7));
/// assert_eq!(interstate_rate(Uf::Ba, Uf::Sp, false), dec!(12));
/// assert_eq!(interstate_rate(Uf::Ba, Uf::Sp, true), dec!(4));
/// ```
pub fn interstate_rate(
    origin: Uf,
    destination: Uf,
    imported: bool,
) -> Decimal {
    interstate_rate_with(origin, destination, imported, default_internal_rate)
}

fn interstate_rate_with(
    origin: Uf,
    destination: Uf,
    imported: bool,
    internal_rate: impl Fn(Uf) -> Decimal,
) -> Decimal {
    if origin == destination {
        return internal_rate(origin);
    }
    if imported {
        return IMPORTED_INTERSTATE_RATE;
    }

    let from_south_or_southeast =
        matches!(origin.region(), Region::South | Region::Southeast) && origin != Uf::Es;
    let to_other_regions = matches!(
        destination.region(),
        Region::North | Region::Northeast | Region::CenterWest
    ) || destination == Uf::Es;

    if from_south_or_southeast && to_other_regions {
        REDUCED_INTERSTATE_RATE
    } else {
        STANDARD_INTERSTATE_RATE
    }
}

/// The default rate table with optional per-state overrides.
///
/// Overrides never touch [`DEFAULT_INTERNAL_RATES`]; they shadow it for the
/// lookups made through this table.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use icms_core::models::{RateTable, Uf};
///
/// let table = RateTable::new().with_override(Uf::Sp, dec!(18.5));
///
/// assert_eq!(table.rate(Uf::Sp), dec!(18.5));
/// assert_eq!(table.rate(Uf::Mg), dec!(18));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    overrides: BTreeMap<Uf, Decimal>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table with `rate` replacing the default for `uf`.
    pub fn with_override(
        mut self,
        uf: Uf,
        rate: Decimal,
    ) -> Self {
        self.overrides.insert(uf, rate);
        self
    }

    /// Destination (internal) rate of `uf`.
    pub fn rate(
        &self,
        uf: Uf,
    ) -> Decimal {
        self.overrides
            .get(&uf)
            .copied()
            .unwrap_or_else(|| default_internal_rate(uf))
    }

    pub fn is_overridden(
        &self,
        uf: Uf,
    ) -> bool {
        self.overrides.contains_key(&uf)
    }

    /// All 27 entries in table order, overrides applied.
    pub fn entries(&self) -> Vec<(Uf, Decimal)> {
        Uf::ALL.iter().map(|uf| (*uf, self.rate(*uf))).collect()
    }

    /// Same as [`interstate_rate`], using this table's internal rates.
    pub fn interstate_rate(
        &self,
        origin: Uf,
        destination: Uf,
        imported: bool,
    ) -> Decimal {
        interstate_rate_with(origin, destination, imported, |uf| self.rate(uf))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // Uf tests
    // =========================================================================

    #[test]
    fn all_lists_27_distinct_units() {
        let codes: HashSet<_> = Uf::ALL.iter().map(Uf::as_str).collect();

        assert_eq!(codes.len(), 27);
    }

    #[test]
    fn parse_accepts_lowercase_and_whitespace() {
        assert_eq!(Uf::parse("sp"), Some(Uf::Sp));
        assert_eq!(Uf::parse(" Ba "), Some(Uf::Ba));
        assert_eq!(Uf::parse("XX"), None);
        assert_eq!(Uf::parse(""), None);
    }

    #[test]
    fn display_prints_uppercase_code() {
        assert_eq!(Uf::Df.to_string(), "DF");
    }

    #[test]
    fn region_counts_match_federation() {
        let count = |region: Region| Uf::ALL.iter().filter(|uf| uf.region() == region).count();

        assert_eq!(count(Region::North), 7);
        assert_eq!(count(Region::Northeast), 9);
        assert_eq!(count(Region::CenterWest), 4);
        assert_eq!(count(Region::Southeast), 4);
        assert_eq!(count(Region::South), 3);
    }

    // =========================================================================
    // rate table tests
    // =========================================================================

    #[test]
    fn default_rates_cover_every_unit_once() {
        let units: HashSet<_> = DEFAULT_INTERNAL_RATES.iter().map(|(uf, _)| *uf).collect();

        assert_eq!(units.len(), 27);
        assert!(
            DEFAULT_INTERNAL_RATES
                .iter()
                .all(|(_, rate)| *rate > Decimal::ZERO && *rate < Decimal::ONE_HUNDRED)
        );
    }

    #[test]
    fn default_internal_rate_looks_up_table() {
        assert_eq!(default_internal_rate(Uf::Sp), dec!(18));
        assert_eq!(default_internal_rate(Uf::Ba), dec!(20.5));
        assert_eq!(default_internal_rate(Uf::Rj), dec!(22));
    }

    #[test]
    fn override_shadows_only_its_unit() {
        let table = RateTable::new().with_override(Uf::Rj, dec!(20));

        assert_eq!(table.rate(Uf::Rj), dec!(20));
        assert!(table.is_overridden(Uf::Rj));
        assert!(!table.is_overridden(Uf::Sp));
        assert_eq!(default_internal_rate(Uf::Rj), dec!(22));
    }

    #[test]
    fn entries_apply_overrides_in_table_order() {
        let table = RateTable::new().with_override(Uf::Ac, dec!(17));

        let entries = table.entries();

        assert_eq!(entries.len(), 27);
        assert_eq!(entries[0], (Uf::Ac, dec!(17)));
        assert_eq!(entries[26], (Uf::To, dec!(20)));
    }

    // =========================================================================
    // interstate_rate tests
    // =========================================================================

    #[test]
    fn south_to_northeast_uses_reduced_rate() {
        assert_eq!(interstate_rate(Uf::Pr, Uf::Pe, false), dec!(7));
    }

    #[test]
    fn southeast_to_espirito_santo_uses_reduced_rate() {
        assert_eq!(interstate_rate(Uf::Mg, Uf::Es, false), dec!(7));
    }

    #[test]
    fn espirito_santo_origin_uses_standard_rate() {
        assert_eq!(interstate_rate(Uf::Es, Uf::Ba, false), dec!(12));
    }

    #[test]
    fn within_south_and_southeast_uses_standard_rate() {
        assert_eq!(interstate_rate(Uf::Sp, Uf::Rs, false), dec!(12));
        assert_eq!(interstate_rate(Uf::Sc, Uf::Rj, false), dec!(12));
    }

    #[test]
    fn north_to_south_uses_standard_rate() {
        assert_eq!(interstate_rate(Uf::Am, Uf::Sp, false), dec!(12));
    }

    #[test]
    fn imported_goods_use_four_percent() {
        assert_eq!(interstate_rate(Uf::Sp, Uf::Ba, true), dec!(4));
    }

    #[test]
    fn same_state_returns_internal_rate() {
        assert_eq!(interstate_rate(Uf::Mg, Uf::Mg, false), dec!(18));
        assert_eq!(interstate_rate(Uf::Mg, Uf::Mg, true), dec!(18));
    }

    #[test]
    fn table_interstate_rate_uses_overridden_internal_rate() {
        let table = RateTable::new().with_override(Uf::Mg, dec!(19));

        assert_eq!(table.interstate_rate(Uf::Mg, Uf::Mg, false), dec!(19));
        assert_eq!(table.interstate_rate(Uf::Mg, Uf::Ba, false), dec!(7));
    }
}
