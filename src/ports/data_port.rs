//! Price data source port.

use crate::domain::error::PricecastError;
use crate::domain::price::Series;

pub trait PriceSource {
    /// Load and validate the full series.
    fn load(&self) -> Result<Series, PricecastError>;
}
