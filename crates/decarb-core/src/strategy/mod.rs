pub mod portfolio;

pub use portfolio::{
    build_strategy_view, Recommendation, StrategyInput, StrategyMetrics, StrategyPortfolio, StrategyView,
};
