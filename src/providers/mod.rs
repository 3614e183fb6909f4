pub mod sina;
pub mod util;
pub mod yahoo_finance;

use crate::core::MarketDataProvider;
use crate::core::config::{AppConfig, ProviderKind};

/// Builds the market data provider selected in the config.
pub fn from_config(config: &AppConfig) -> Box<dyn MarketDataProvider> {
    match config.provider {
        ProviderKind::Sina => Box::new(sina::SinaFuturesProvider::new(config.sina_base_url())),
        ProviderKind::Yahoo => Box::new(yahoo_finance::YahooFinanceProvider::new(
            config.yahoo_base_url(),
        )),
    }
}
