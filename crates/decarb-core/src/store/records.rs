//! `Record` implementations for the persisted types.

use chrono::{DateTime, Utc};

use crate::store::Record;

macro_rules! stamped {
    () => {
        fn stamp(&mut self, now: DateTime<Utc>) {
            self.created_at.get_or_insert(now);
            self.updated_at = Some(now);
        }
    };
}

#[cfg(feature = "inventory")]
impl Record for crate::inventory::calculation::FuelEnergyCalculation {
    const KIND: &'static str = "calculations";

    fn key(&self) -> &str {
        &self.id
    }

    stamped!();
}

#[cfg(feature = "abatement")]
impl Record for crate::abatement::project::AbatementProject {
    const KIND: &'static str = "abatement_projects";

    fn key(&self) -> &str {
        &self.id
    }

    stamped!();
}

#[cfg(feature = "projects")]
impl Record for crate::projects::record::CO2ProjectRecord {
    const KIND: &'static str = "co2_projects";

    fn key(&self) -> &str {
        &self.id
    }

    stamped!();

    fn normalize(&mut self) {
        if self.enforce_invariants() {
            tracing::debug!(project = %self.id, "specific-convention outputs pinned");
        }
    }
}

#[cfg(feature = "strategy")]
impl Record for crate::strategy::portfolio::StrategyPortfolio {
    const KIND: &'static str = "strategies";

    fn key(&self) -> &str {
        &self.id
    }

    stamped!();
}

#[cfg(feature = "tracking")]
impl Record for crate::tracking::ledger::ActualsLedger {
    const KIND: &'static str = "actuals";

    fn key(&self) -> &str {
        &self.project_id
    }
}
