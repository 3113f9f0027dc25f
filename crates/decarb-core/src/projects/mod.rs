pub mod accounting;
pub mod mapping;
pub mod record;

pub use accounting::{calculate_emissions, compute_emission_totals, EmissionTotals, MaterialRow};
pub use mapping::{map_costing, CostingMapping, CostingSchemaV1};
pub use record::{CO2ProjectRecord, CostingRow};
