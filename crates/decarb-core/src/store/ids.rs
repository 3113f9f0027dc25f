//! Human-readable identifier generators.
//!
//! Identifiers are opaque to the calculations; these helpers only give
//! saved records recognisable keys.

use rand::Rng;

/// First `len` ASCII alphanumerics of `value`, uppercased.
fn code(value: &str, len: usize, fallback: &str) -> String {
    let code: String = value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(len)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if code.is_empty() {
        fallback.to_string()
    } else {
        code
    }
}

fn hex_suffix(digits: usize) -> String {
    let max = 1u64 << (4 * digits);
    let n: u64 = rand::thread_rng().gen_range(0..max);
    format!("{n:0width$X}", width = digits)
}

/// `ORG-SEC-2030-1A2B3C` for a fuel/energy calculation.
pub fn calculation_id(org_name: &str, sector: &str, target_year: i32) -> String {
    format!(
        "{}-{}-{}-{}",
        code(org_name, 3, ""),
        code(sector, 3, ""),
        target_year,
        hex_suffix(6)
    )
}

/// Project metadata that feeds an identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectIdParts<'a> {
    pub organization: &'a str,
    pub entity_name: &'a str,
    pub unit_name: &'a str,
    pub project_name: &'a str,
    pub target_year: i32,
    pub project_owner: &'a str,
}

impl ProjectIdParts<'_> {
    fn base(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}-{}",
            code(self.organization, 3, "ORG"),
            code(self.entity_name, 2, "EN"),
            code(self.unit_name, 2, "UN"),
            code(self.project_name, 3, "PRJ"),
            self.target_year,
            code(self.project_owner, 2, "PO"),
        )
    }
}

/// `ORG-EN-UN-PRJ-2030-PO-1A2B` for a CO2 project.
pub fn project_id(parts: &ProjectIdParts<'_>) -> String {
    format!("{}-{}", parts.base(), hex_suffix(4))
}

/// `MACC-ORG-EN-UN-PRJ-2030-PO-1A2B` for an abatement project.
pub fn abatement_project_id(parts: &ProjectIdParts<'_>) -> String {
    format!("MACC-{}", project_id(parts))
}

/// Eight lowercase hex digits for a strategy portfolio.
pub fn portfolio_id() -> String {
    hex_suffix(8).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_upper_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    }

    #[test]
    fn test_calculation_id_shape() {
        let id = calculation_id("Acme Steel", "steel", 2030);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts[..3], ["ACM", "STE", "2030"]);
        assert_eq!(parts[3].len(), 6);
        assert!(is_upper_hex(parts[3]));
    }

    #[test]
    fn test_codes_skip_spaces_and_punctuation() {
        let id = calculation_id("A B Corp", "Steel", 2030);
        assert!(id.starts_with("ABC-STE-2030-"));
        let id = calculation_id(" é/ ", "Cement & Lime", 2031);
        assert!(id.starts_with("-CEM-2031-"));
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn test_project_id_defaults() {
        let id = project_id(&ProjectIdParts {
            target_year: 2030,
            ..Default::default()
        });
        assert!(id.starts_with("ORG-EN-UN-PRJ-2030-PO-"));
        assert_eq!(id.len(), "ORG-EN-UN-PRJ-2030-PO-".len() + 4);
    }

    #[test]
    fn test_project_id_codes() {
        let id = abatement_project_id(&ProjectIdParts {
            organization: "acme",
            entity_name: "plant",
            unit_name: "kiln",
            project_name: "heat recovery",
            target_year: 2028,
            project_owner: "jdoe",
        });
        assert!(id.starts_with("MACC-ACM-PL-KI-HEA-2028-JD-"));
    }

    #[test]
    fn test_portfolio_id() {
        let id = portfolio_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
