use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReactionData {
    #[serde(alias = "equations")]
    pub steps: Vec<ReactionStep>,
    pub reactants: Vec<String>,
    pub products: Vec<String>,
    pub conditions: Vec<String>,
    pub reversible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReactionStep {
    pub reactants: Vec<String>,
    pub products: Vec<String>,
    #[serde(alias = "condition")]
    pub conditions: Vec<String>,
    pub reversible: bool,
}

impl ReactionData {
    /// Declared steps, or the single top-level step when no list is given.
    pub fn effective_steps(&self) -> Vec<ReactionStep> {
        if !self.steps.is_empty() {
            return self.steps.clone();
        }
        if self.reactants.is_empty() && self.products.is_empty() {
            return Vec::new();
        }
        vec![ReactionStep {
            reactants: self.reactants.clone(),
            products: self.products.clone(),
            conditions: self.conditions.clone(),
            reversible: self.reversible,
        }]
    }
}
