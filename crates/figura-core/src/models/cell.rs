use super::normalize_word;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CellData {
    #[serde(alias = "kind", alias = "type")]
    pub cell_type: CellKind,
    #[serde(alias = "organelles")]
    pub structures: Vec<String>,
    #[serde(alias = "highlighted")]
    pub highlight: Vec<String>,
    pub show_labels: bool,
}

impl Default for CellData {
    fn default() -> Self {
        Self {
            cell_type: CellKind::Animal,
            structures: Vec::new(),
            highlight: Vec::new(),
            show_labels: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum CellKind {
    #[default]
    Animal,
    Plant,
}

impl From<String> for CellKind {
    fn from(value: String) -> Self {
        match normalize_word(&value).as_str() {
            "plant" | "plant_cell" => Self::Plant,
            _ => Self::Animal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Organelle {
    CellWall,
    Membrane,
    Cytoplasm,
    Vacuole,
    Nucleus,
    EndoplasmicReticulum,
    Golgi,
    Mitochondria,
    Chloroplast,
    Lysosome,
    Ribosome,
}

impl Organelle {
    pub const ALL: [Organelle; 11] = [
        Organelle::CellWall,
        Organelle::Membrane,
        Organelle::Cytoplasm,
        Organelle::Vacuole,
        Organelle::Nucleus,
        Organelle::EndoplasmicReticulum,
        Organelle::Golgi,
        Organelle::Mitochondria,
        Organelle::Chloroplast,
        Organelle::Lysosome,
        Organelle::Ribosome,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        let word = normalize_word(tag);
        let word = word.strip_suffix('s').filter(|w| w.len() > 3).unwrap_or(&word);
        Some(match word {
            "cell_wall" | "wall" => Self::CellWall,
            "membrane" | "cell_membrane" | "plasma_membrane" => Self::Membrane,
            "cytoplasm" => Self::Cytoplasm,
            "vacuole" | "central_vacuole" => Self::Vacuole,
            "nucleu" | "nucleus" | "nuclei" => Self::Nucleus,
            "er" | "endoplasmic_reticulum" | "rough_er" | "smooth_er" => {
                Self::EndoplasmicReticulum
            }
            "golgi" | "golgi_body" | "golgi_apparatu" | "golgi_apparatus" => Self::Golgi,
            "mitochondria" | "mitochondrion" | "mitochondrium" => Self::Mitochondria,
            "chloroplast" => Self::Chloroplast,
            "lysosome" => Self::Lysosome,
            "ribosome" => Self::Ribosome,
            _ => return None,
        })
    }

    pub fn plant_only(self) -> bool {
        matches!(self, Self::Chloroplast | Self::Vacuole | Self::CellWall)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::CellWall => "Cell wall",
            Self::Membrane => "Cell membrane",
            Self::Cytoplasm => "Cytoplasm",
            Self::Vacuole => "Vacuole",
            Self::Nucleus => "Nucleus",
            Self::EndoplasmicReticulum => "Endoplasmic reticulum",
            Self::Golgi => "Golgi apparatus",
            Self::Mitochondria => "Mitochondria",
            Self::Chloroplast => "Chloroplast",
            Self::Lysosome => "Lysosome",
            Self::Ribosome => "Ribosome",
        }
    }
}
