pub mod ledger;
pub mod variance;

pub use ledger::{ActualEntry, ActualsLedger, AmpActual, Section};
pub use variance::{track_actuals, TrackingInput, TrackingReport, TrackingSummary, YearActuals};
