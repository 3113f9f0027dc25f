pub mod curve;
pub mod mac;
pub mod project;
pub mod scenario;

pub use curve::{build_macc, MaccCurve, MaccProject};
pub use mac::{calculate_mac, marginal_abatement_cost, MacFigures, MacInput};
pub use project::AbatementProject;
pub use scenario::{appraise_scenario, build_cashflow_series, net_present_value, InvestmentScenario};
