use super::normalize_word;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CircuitData {
    #[serde(alias = "elements")]
    pub components: Vec<CircuitComponent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircuitComponent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Battery,
    Resistor,
    Capacitor,
    Switch,
    Ammeter,
    Voltmeter,
    Bulb,
    Other,
}

impl CircuitComponent {
    pub fn component_kind(&self) -> ComponentKind {
        match normalize_word(&self.kind).as_str() {
            "battery" | "cell" | "power" | "source" => ComponentKind::Battery,
            "resistor" | "rheostat" | "resistance" => ComponentKind::Resistor,
            "capacitor" => ComponentKind::Capacitor,
            "switch" | "key" => ComponentKind::Switch,
            "ammeter" => ComponentKind::Ammeter,
            "voltmeter" => ComponentKind::Voltmeter,
            "bulb" | "lamp" | "light" | "light_bulb" => ComponentKind::Bulb,
            _ => ComponentKind::Other,
        }
    }
}
