pub mod bau;
pub mod calculation;
pub mod factors;

pub use bau::{analyze_inventory, InventoryAnalysis, WaterfallMeasure, WaterfallStep};
pub use calculation::FuelEnergyCalculation;
pub use factors::EmissionFactorRow;
