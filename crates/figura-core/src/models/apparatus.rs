use super::normalize_word;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApparatusData {
    #[serde(alias = "items", alias = "apparatus")]
    pub equipment: Vec<Equipment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Equipment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentKind {
    Flask,
    Beaker,
    Tube,
    Lamp,
    Funnel,
    GasJar,
    Other,
}

impl Equipment {
    pub fn equipment_kind(&self) -> EquipmentKind {
        match normalize_word(&self.kind).as_str() {
            "flask" | "conical_flask" | "erlenmeyer" | "erlenmeyer_flask" | "round_flask" => {
                EquipmentKind::Flask
            }
            "beaker" => EquipmentKind::Beaker,
            "tube" | "test_tube" | "testtube" => EquipmentKind::Tube,
            "lamp" | "alcohol_lamp" | "burner" | "spirit_lamp" => EquipmentKind::Lamp,
            "funnel" | "separatory_funnel" => EquipmentKind::Funnel,
            "gas_jar" | "gasjar" | "jar" | "collecting_bottle" => EquipmentKind::GasJar,
            _ => EquipmentKind::Other,
        }
    }
}
