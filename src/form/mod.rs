use anyhow::{Context as _, Result};
use clap::ValueEnum;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Department menu offered to the model when it staffs a charter.
pub const DEPARTMENTS: [&str; 12] = [
    "Sales Ops", "Service Ops", "Finance Ops", "Procurement", "IT", "QA",
    "Compliance", "Supply Chain", "Manufacturing", "Shared Services", "Training", "PMO",
];

/// Organizational tiers, declared high → low in governance.
/// The derived `Ord` follows declaration order and is what selections sort by.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrgTier {
    Executive,
    SeniorManagement,
    MiddleManagement,
    Supervisory,
    Operational,
}

impl OrgTier {
    pub fn label(self) -> &'static str {
        match self {
            OrgTier::Executive => "Executive Tier (CEO, COO, CFO, CTO, President)",
            OrgTier::SeniorManagement => "Senior Management Tier (Vice Presidents, Directors, General Managers)",
            OrgTier::MiddleManagement => "Middle Management Tier (Managers, Team Leaders, Department Heads)",
            OrgTier::Supervisory => "Supervisory Tier (Supervisors, Shift Leaders, Coordinators)",
            OrgTier::Operational => "Operational Tier (Staff, Associates, Technicians, Entry-Level Employees)",
        }
    }
}

/// Selected tiers, always held in canonical order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<OrgTier>", into = "Vec<OrgTier>")]
pub struct TierSelection(Vec<OrgTier>);

impl TierSelection {
    pub fn new<I: IntoIterator<Item = OrgTier>>(tiers: I) -> Self {
        let mut v: Vec<OrgTier> = tiers.into_iter().collect();
        v.sort();
        v.dedup();
        Self(v)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tiers(&self) -> &[OrgTier] {
        &self.0
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.0.iter().map(|t| t.label()).collect()
    }
}

impl Default for TierSelection {
    fn default() -> Self {
        Self::new([OrgTier::SeniorManagement, OrgTier::MiddleManagement, OrgTier::Operational])
    }
}

impl From<Vec<OrgTier>> for TierSelection {
    fn from(v: Vec<OrgTier>) -> Self {
        Self::new(v)
    }
}

impl From<TierSelection> for Vec<OrgTier> {
    fn from(s: TierSelection) -> Self {
        s.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub region: String,
    pub industry: String,
    pub fy_start: String,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            region: "APAC".into(),
            industry: "Shared Services".into(),
            fy_start: "Jan 1".into(),
        }
    }
}

/// Raw sticky-note blocks, one note per line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwotInput {
    pub strengths: String,
    pub weaknesses: String,
    pub opportunities: String,
    pub threats: String,
}

impl SwotInput {
    /// Each block with surrounding whitespace removed; inner lines are left as typed.
    pub fn trimmed(&self) -> SwotInput {
        SwotInput {
            strengths: self.strengths.trim().to_string(),
            weaknesses: self.weaknesses.trim().to_string(),
            opportunities: self.opportunities.trim().to_string(),
            threats: self.threats.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierSection {
    pub include: bool,
    pub selected: TierSelection,
}

impl Default for TierSection {
    fn default() -> Self {
        Self { include: true, selected: TierSelection::default() }
    }
}

/// Everything one generation request needs from the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub context: Context,
    pub tiers: TierSection,
    pub swot: SwotInput,
}

impl FormInput {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing form TOML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s).with_context(|| format!("reading form {}", path.display()))
    }

    /// Tiers that actually reach the prompt: none unless inclusion is on.
    pub fn effective_tiers(&self) -> TierSelection {
        if self.tiers.include {
            self.tiers.selected.clone()
        } else {
            TierSelection::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_uses_governance_order() {
        let sel = TierSelection::new([OrgTier::Operational, OrgTier::Executive, OrgTier::Supervisory]);
        assert_eq!(
            sel.tiers(),
            &[OrgTier::Executive, OrgTier::Supervisory, OrgTier::Operational]
        );
    }

    #[test]
    fn selection_drops_duplicates() {
        let sel = TierSelection::new([OrgTier::Operational, OrgTier::Operational]);
        assert_eq!(sel.tiers().len(), 1);
    }

    #[test]
    fn defaults_match_sample_form() {
        let form = FormInput::default();
        assert_eq!(form.context.region, "APAC");
        assert_eq!(form.context.industry, "Shared Services");
        assert_eq!(form.context.fy_start, "Jan 1");
        assert!(form.tiers.include);
        assert_eq!(
            form.tiers.selected.tiers(),
            &[OrgTier::SeniorManagement, OrgTier::MiddleManagement, OrgTier::Operational]
        );
    }

    #[test]
    fn form_toml_partial_and_scrambled_tiers() {
        let form = FormInput::from_toml_str(
            r#"
[context]
region = "EMEA"

[tiers]
selected = ["operational", "executive"]

[swot]
weaknesses = """
  Late invoices
Manual rework
"""
"#,
        )
        .unwrap();
        assert_eq!(form.context.region, "EMEA");
        assert_eq!(form.context.industry, "Shared Services");
        assert!(form.tiers.include);
        assert_eq!(form.tiers.selected.tiers(), &[OrgTier::Executive, OrgTier::Operational]);
        assert_eq!(form.swot.trimmed().weaknesses, "Late invoices\nManual rework");
    }

    #[test]
    fn excluded_tiers_are_empty() {
        let mut form = FormInput::default();
        form.tiers.include = false;
        assert!(form.effective_tiers().is_empty());
    }

    #[test]
    fn unknown_tier_is_rejected() {
        assert!(FormInput::from_toml_str("[tiers]\nselected = [\"board\"]\n").is_err());
    }
}
