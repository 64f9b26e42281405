use crate::naming::MemberDescriptor;
use serde::{Deserialize, Serialize};

/// Skips members whose post-processing descriptor and quantity code both match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub ppdf: String,
    pub quantity: String,
}

impl ExclusionRule {
    pub fn new(ppdf: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            ppdf: ppdf.into(),
            quantity: quantity.into(),
        }
    }

    pub fn matches(&self, descriptor: &MemberDescriptor) -> bool {
        descriptor.ppdf == self.ppdf && descriptor.quantity == self.quantity
    }
}

/// Members known to be redundant and left out of raw-archive merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionList {
    rules: Vec<ExclusionRule>,
}

impl Default for ExclusionList {
    /// The iterative ZPHI post-processing repeats the ZDR channel.
    fn default() -> Self {
        Self {
            rules: vec![ExclusionRule::new("ZPHI_ITER_DEFAULT.dpatc", "ZDR")],
        }
    }
}

impl ExclusionList {
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }

    pub fn excludes(&self, descriptor: &MemberDescriptor) -> bool {
        self.rules.iter().any(|rule| rule.matches(descriptor))
    }

    /// Whether a member takes part in a raw merge at all.
    pub fn admits(&self, descriptor: &MemberDescriptor) -> bool {
        descriptor.is_raw() && !self.excludes(descriptor)
    }
}
