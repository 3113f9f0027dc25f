use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of a project a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Input,
    Output,
}

/// A measured value for one project row in one tracking year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualEntry {
    #[serde(alias = "section_type")]
    pub section: Section,
    #[serde(default)]
    pub material_name: String,
    /// Position of the row in the project's input or output list.
    #[serde(default, deserialize_with = "crate::coerce::count")]
    pub row_index: u32,
    /// Tracking year, 1-based from implementation.
    #[serde(default, alias = "year_number", deserialize_with = "crate::coerce::count")]
    pub year: u32,
    #[serde(default, deserialize_with = "crate::coerce::optional_decimal")]
    pub absolute_value: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::coerce::optional_decimal")]
    pub specific_value: Option<Decimal>,
}

/// Actual annual material production for one tracking year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmpActual {
    #[serde(default, alias = "year_number", deserialize_with = "crate::coerce::count")]
    pub year: u32,
    #[serde(default, deserialize_with = "crate::coerce::optional_decimal")]
    pub amp_value: Option<Decimal>,
}

/// All actuals recorded for one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActualsLedger {
    pub project_id: String,
    #[serde(default)]
    pub entries: Vec<ActualEntry>,
    #[serde(default)]
    pub amp: Vec<AmpActual>,
}

impl ActualsLedger {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    /// Insert or replace the entry for `(section, row_index, year)`.
    pub fn upsert_entry(&mut self, entry: ActualEntry) {
        self.entries.retain(|e| {
            !(e.section == entry.section && e.row_index == entry.row_index && e.year == entry.year)
        });
        self.entries.push(entry);
    }

    /// Insert or replace the AMP actual for `year`.
    pub fn set_amp(&mut self, year: u32, amp_value: Option<Decimal>) {
        self.amp.retain(|a| a.year != year);
        self.amp.push(AmpActual { year, amp_value });
    }

    /// Replace everything recorded for `year`.
    pub fn replace_year(&mut self, year: u32, entries: Vec<ActualEntry>, amp_value: Option<Decimal>) {
        self.clear_year(year);
        for mut entry in entries {
            entry.year = year;
            self.upsert_entry(entry);
        }
        if amp_value.is_some() {
            self.set_amp(year, amp_value);
        }
    }

    pub fn clear_year(&mut self, year: u32) {
        self.entries.retain(|e| e.year != year);
        self.amp.retain(|a| a.year != year);
    }

    /// Years with at least one entry or AMP value, ascending.
    pub fn years(&self) -> BTreeSet<u32> {
        self.entries
            .iter()
            .map(|e| e.year)
            .chain(self.amp.iter().map(|a| a.year))
            .collect()
    }

    pub fn entries_for(&self, year: u32) -> impl Iterator<Item = &ActualEntry> {
        self.entries.iter().filter(move |e| e.year == year)
    }

    pub fn amp_for(&self, year: u32) -> Option<Decimal> {
        self.amp
            .iter()
            .find(|a| a.year == year)
            .and_then(|a| a.amp_value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.amp.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(section: Section, row_index: u32, year: u32, abs: Decimal) -> ActualEntry {
        ActualEntry {
            section,
            material_name: String::new(),
            row_index,
            year,
            absolute_value: Some(abs),
            specific_value: None,
        }
    }

    #[test]
    fn test_upsert_replaces_same_key() {
        let mut ledger = ActualsLedger::new("P-1");
        ledger.upsert_entry(entry(Section::Input, 0, 1, dec!(10)));
        ledger.upsert_entry(entry(Section::Input, 0, 1, dec!(12)));
        ledger.upsert_entry(entry(Section::Output, 0, 1, dec!(5)));
        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(
            ledger.entries_for(1).find(|e| e.section == Section::Input).unwrap().absolute_value,
            Some(dec!(12))
        );
    }

    #[test]
    fn test_replace_year_drops_old_values() {
        let mut ledger = ActualsLedger::new("P-1");
        ledger.upsert_entry(entry(Section::Input, 0, 2, dec!(10)));
        ledger.upsert_entry(entry(Section::Input, 1, 2, dec!(10)));
        ledger.set_amp(2, Some(dec!(900)));
        ledger.replace_year(2, vec![entry(Section::Input, 0, 99, dec!(7))], None);
        assert_eq!(ledger.entries_for(2).count(), 1);
        assert_eq!(ledger.entries_for(2).next().unwrap().absolute_value, Some(dec!(7)));
        assert_eq!(ledger.amp_for(2), None);
    }

    #[test]
    fn test_years_union() {
        let mut ledger = ActualsLedger::new("P-1");
        ledger.upsert_entry(entry(Section::Input, 0, 3, dec!(1)));
        ledger.set_amp(1, Some(dec!(100)));
        let years: Vec<u32> = ledger.years().into_iter().collect();
        assert_eq!(years, vec![1, 3]);
    }

    #[test]
    fn test_legacy_row_shape() {
        let e: ActualEntry = serde_json::from_str(
            r#"{"section_type": "output", "material_name": "Steel", "row_index": 0,
                "year_number": "2", "absolute_value": null, "specific_value": 1.0}"#,
        )
        .unwrap();
        assert_eq!(e.section, Section::Output);
        assert_eq!(e.year, 2);
        assert_eq!(e.absolute_value, None);
        assert_eq!(e.specific_value, Some(dec!(1)));
    }
}
