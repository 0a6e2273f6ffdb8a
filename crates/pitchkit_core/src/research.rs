//! Brand research produced by the text model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field map of one research section.
pub type SectionFields = BTreeMap<String, serde_json::Value>;

/// Wire names of the five required research sections, in display order.
pub const RESEARCH_SECTIONS: [&str; 5] = [
    "brandEssence",
    "creativeOpportunities",
    "strategicContext",
    "brandVoice",
    "implementation",
];

/// Structured brand research.
///
/// Every section is always present. When the model's answer could not be
/// parsed, sections hold placeholders and `raw_response` carries the
/// original text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    /// Core identity, purpose and personality
    pub brand_essence: SectionFields,
    /// Campaign angles worth pursuing
    pub creative_opportunities: SectionFields,
    /// Market and competitive context
    pub strategic_context: SectionFields,
    /// Tone and vocabulary guidance
    pub brand_voice: SectionFields,
    /// Practical execution notes
    pub implementation: SectionFields,
    /// Unparsed model output, present only when extraction degraded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ResearchResult {
    /// Looks up a section by its wire name.
    pub fn section(&self, name: &str) -> Option<&SectionFields> {
        match name {
            "brandEssence" => Some(&self.brand_essence),
            "creativeOpportunities" => Some(&self.creative_opportunities),
            "strategicContext" => Some(&self.strategic_context),
            "brandVoice" => Some(&self.brand_voice),
            "implementation" => Some(&self.implementation),
            _ => None,
        }
    }

    /// True when the research was synthesized from unparseable output.
    pub fn is_degraded(&self) -> bool {
        self.raw_response.is_some()
    }
}
