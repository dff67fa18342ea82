use serde::Serialize;

use crate::errors::S2cError;
use crate::form::{FormInput, TierSelection, DEPARTMENTS};

pub mod template;

use template::Template;

pub const SYSTEM_TEXT: &str = r#"You are an AI Lean Six Sigma Black Belt coach. You ingest SWOT sticky notes (70–100 items), cluster them by theme, and produce:
1) a Theme Map per quadrant,
2) compliant Problem Statements (specific, data-driven, one problem, no solution),
3) a prioritized list (Impact × Controllability, 0–5 each, with rationale),
4) draft DMAIC Project Charters with departments, CTQs, savings band, duration, and start date.

Follow IASSC/ASQ BoK structure. Be explicit and concise. Use only information inferred from notes plus reasonable Lean heuristics; do not invent precise numbers without labeling them as estimates."#;

pub const USER_TEMPLATE: &str = r#"Context:
- Region/Market (optional): {region}
- Industry (optional): {industry}
- Fiscal Year start (e.g., Jan 1): {fy_start}

Input Notes:
Strengths:
{strengths_text}

Weaknesses:
{weaknesses_text}

Opportunities:
{opportunities_text}

Threats:
{threats_text}

Tasks:
A) Cluster notes into 2–5 themes per quadrant. Name each theme and show a 1–2 line rationale.
B) From Weaknesses and Threats only, propose 3–8 Problem Statements that obey ALL rules:
   - Specific & data-driven (use counts/percents/ranges if present; else clearly mark as "estimate").
   - One problem per statement.
   - No solutions.
C) Score each proposed problem: Impact (0–5) × Controllability (0–5). Explain in one sentence.
D) For top 3 problems, generate a one-page DMAIC Charter with:
   - Title, Problem Statement, Business Case
   - Goal (SMART, with target and date)
   - Scope / Out of Scope
   - CTQs & baseline (state if estimated)
   - Departments / Teams to involve (choose from: {dept_menu})
   - Savings band (Low: < $100k; Med: $100k–$500k; High: $500k–$1.5M; Very High: > $1.5M) + rationale
   - Duration (Kaizen 2–4w, DMAIC Light 8–12w, Full DMAIC 16–24w) + rationale
   - Proposed Start Date (nearest quarter boundary or ≥30 days from today, aligned to {fy_start})
   - High-level DMAIC plan (bulleted by phase)
E) Return a compact portfolio table (CSV-style) listing:
   Problem_ID, Theme, Impact, Control, Savings_Band, Duration, Dept(s), Proposed_Start{tier_col_hint}.

Output format:
1) THEME MAP
2) PROBLEM STATEMENTS (rule-check table: ✓/✗ for "specific", "single problem", "no solution")
3) PRIORITIZED LIST (with Impact×Control and rationale)
4) PROJECT CHARTERS (3){tier_block_instruction}
5) PORTFOLIO TABLE

{tier_guidance}"#;

const TIER_BLOCK_INSTRUCTION: &str =
    "\n   - Include a field: Organizational Tier(s) Impacted, with governance notes aligned to selected tiers.";
const TIER_COL_HINT: &str = ", Org_Tier(s)";

/// The three tier-dependent template fragments. All empty unless tiers are
/// included and at least one is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierFragments {
    pub block_instruction: String,
    pub col_hint: String,
    pub guidance: String,
}

impl TierFragments {
    pub fn resolve(include: bool, selected: &TierSelection) -> Self {
        if !include || selected.is_empty() {
            return Self::default();
        }
        Self {
            block_instruction: block_instruction(selected),
            col_hint: col_hint(selected),
            guidance: guidance(selected),
        }
    }
}

fn block_instruction(selected: &TierSelection) -> String {
    if selected.is_empty() { String::new() } else { TIER_BLOCK_INSTRUCTION.to_string() }
}

fn col_hint(selected: &TierSelection) -> String {
    if selected.is_empty() { String::new() } else { TIER_COL_HINT.to_string() }
}

fn guidance(selected: &TierSelection) -> String {
    if selected.is_empty() {
        return String::new();
    }
    format!(
        "Organizational Tier guidance:\n- Selected tiers (high → low): {}\n- Align stakeholder engagement, approvals, and communications to these tiers.\n",
        selected.labels().join(" > ")
    )
}

/// Fully resolved system/user pair sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

impl ComposedPrompt {
    /// System and user text separated by a blank line, as offered for download.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

pub fn dept_menu() -> String {
    DEPARTMENTS.join(", ")
}

pub fn user_prompt(form: &FormInput) -> Result<String, S2cError> {
    let notes = form.swot.trimmed();
    let tiers = TierFragments::resolve(form.tiers.include, &form.tiers.selected);

    let mut t = Template::new(USER_TEMPLATE);
    t.set("region", form.context.region.as_str())
        .set("industry", form.context.industry.as_str())
        .set("fy_start", form.context.fy_start.as_str())
        .set("strengths_text", notes.strengths)
        .set("weaknesses_text", notes.weaknesses)
        .set("opportunities_text", notes.opportunities)
        .set("threats_text", notes.threats)
        .set("dept_menu", dept_menu())
        .set("tier_block_instruction", tiers.block_instruction)
        .set("tier_col_hint", tiers.col_hint)
        .set("tier_guidance", tiers.guidance);
    t.render()
}

pub fn compose(form: &FormInput) -> Result<ComposedPrompt, S2cError> {
    let user = user_prompt(form)?;
    tracing::debug!(user_chars = user.chars().count(), "composed user prompt");
    Ok(ComposedPrompt { system: SYSTEM_TEXT.to_string(), user })
}
