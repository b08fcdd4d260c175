mod purpose;
mod state;

pub use purpose::Purpose;
pub use state::{
    DEFAULT_INTERNAL_RATES, IMPORTED_INTERSTATE_RATE, REDUCED_INTERSTATE_RATE, RateTable, Region,
    STANDARD_INTERSTATE_RATE, Uf, default_internal_rate, interstate_rate,
};
