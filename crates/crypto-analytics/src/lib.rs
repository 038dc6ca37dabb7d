//! Pure analytics over daily price history: returns, volatility, correlation,
//! seasonality, market-cap dominance and short-horizon price forecasts.

pub mod alignment;
pub mod correlation;
pub mod dominance;
pub mod prediction;
pub mod returns;
pub mod seasonal;
pub mod trends;
pub mod volatility;


pub use alignment::*;
pub use correlation::*;
pub use dominance::*;
pub use prediction::*;
pub use returns::*;
pub use seasonal::*;
pub use trends::*;
pub use volatility::*;
