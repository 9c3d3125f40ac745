use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoleculeData {
    #[serde(alias = "notation", alias = "structure", alias = "formula")]
    pub smiles: String,
    #[serde(alias = "displayName")]
    pub name: Option<String>,
}

impl MoleculeData {
    pub fn notation(&self) -> Option<&str> {
        let t = self.smiles.trim();
        (!t.is_empty()).then_some(t)
    }
}
