use crate::models::{
    apparatus::ApparatusData, cell::CellData, circuit::CircuitData, climate::ClimateData,
    coordinate::CoordinateData, force::ForceData, function_graph::FunctionGraphData,
    generic::GenericData, geometry::GeometryData, molecule::MoleculeData, normalize_word,
    optics::OpticsData, process_flow::FlowData, reaction::ReactionData,
};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The closed set of diagram domains. Unknown `type` strings map to [`DomainTag::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainTag {
    Geometry,
    FunctionGraph,
    CoordinateVector,
    Force,
    Circuit,
    Optics,
    Molecule,
    Reaction,
    Apparatus,
    Cell,
    ProcessFlow,
    Climate,
    Generic,
}

impl DomainTag {
    pub fn from_type_str(raw: &str) -> Self {
        match normalize_word(raw).as_str() {
            "geometry" | "plane_geometry" | "triangle" => Self::Geometry,
            "function" | "function_graph" | "graph" | "plot" => Self::FunctionGraph,
            "coordinate" | "coordinates" | "vector" | "vectors" | "coordinate_vector" => {
                Self::CoordinateVector
            }
            "force" | "forces" | "mechanics" | "free_body" => Self::Force,
            "circuit" | "electric_circuit" => Self::Circuit,
            "optics" | "lens" | "ray_diagram" => Self::Optics,
            "molecule" | "chemical_structure" | "structure" => Self::Molecule,
            "reaction" | "chemical_equation" | "equation" => Self::Reaction,
            "apparatus" | "lab_apparatus" | "experiment" => Self::Apparatus,
            "cell" | "cell_structure" => Self::Cell,
            "flow" | "flowchart" | "process" | "process_flow" => Self::ProcessFlow,
            "climate" | "climate_chart" | "geography" => Self::Climate,
            _ => Self::Generic,
        }
    }

    /// Stable lowercase name, used for CSS classes and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::FunctionGraph => "function",
            Self::CoordinateVector => "coordinate",
            Self::Force => "force",
            Self::Circuit => "circuit",
            Self::Optics => "optics",
            Self::Molecule => "molecule",
            Self::Reaction => "reaction",
            Self::Apparatus => "apparatus",
            Self::Cell => "cell",
            Self::ProcessFlow => "flow",
            Self::Climate => "climate",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for DomainTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, typed payload of one diagram.
#[derive(Debug, Clone)]
pub enum DomainData {
    Geometry(GeometryData),
    FunctionGraph(FunctionGraphData),
    CoordinateVector(CoordinateData),
    Force(ForceData),
    Circuit(CircuitData),
    Optics(OpticsData),
    Molecule(MoleculeData),
    Reaction(ReactionData),
    Apparatus(ApparatusData),
    Cell(CellData),
    ProcessFlow(FlowData),
    Climate(ClimateData),
    Generic(GenericData),
}

impl DomainData {
    pub fn tag(&self) -> DomainTag {
        match self {
            Self::Geometry(_) => DomainTag::Geometry,
            Self::FunctionGraph(_) => DomainTag::FunctionGraph,
            Self::CoordinateVector(_) => DomainTag::CoordinateVector,
            Self::Force(_) => DomainTag::Force,
            Self::Circuit(_) => DomainTag::Circuit,
            Self::Optics(_) => DomainTag::Optics,
            Self::Molecule(_) => DomainTag::Molecule,
            Self::Reaction(_) => DomainTag::Reaction,
            Self::Apparatus(_) => DomainTag::Apparatus,
            Self::Cell(_) => DomainTag::Cell,
            Self::ProcessFlow(_) => DomainTag::ProcessFlow,
            Self::Climate(_) => DomainTag::Climate,
            Self::Generic(_) => DomainTag::Generic,
        }
    }
}

/// One figure to render: `{ type, title?, data }`.
#[derive(Debug, Clone)]
pub struct DiagramSpec {
    pub tag: DomainTag,
    /// The `type` string as written by the producer (empty when missing).
    pub declared_type: String,
    pub title: Option<String>,
    pub data: DomainData,
}

impl DiagramSpec {
    /// Validates a raw JSON spec at the boundary, before any renderer runs.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(Error::InvalidSpec {
                message: format!("expected a JSON object, found {}", json_kind(value)),
            });
        };

        let declared_type = match obj.get("type") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => {
                return Err(Error::InvalidSpec {
                    message: format!("`type` must be a string, found {}", json_kind(other)),
                });
            }
        };
        let tag = DomainTag::from_type_str(&declared_type);

        let title = obj
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let empty = Value::Object(serde_json::Map::new());
        let data_value = match obj.get("data") {
            Some(Value::Null) | None if tag == DomainTag::Generic => value,
            Some(Value::Null) | None => &empty,
            Some(v) => v,
        };

        let data = match tag {
            DomainTag::Geometry => DomainData::Geometry(typed(&declared_type, data_value)?),
            DomainTag::FunctionGraph => {
                DomainData::FunctionGraph(typed(&declared_type, data_value)?)
            }
            DomainTag::CoordinateVector => {
                DomainData::CoordinateVector(typed(&declared_type, data_value)?)
            }
            DomainTag::Force => DomainData::Force(typed(&declared_type, data_value)?),
            DomainTag::Circuit => DomainData::Circuit(typed(&declared_type, data_value)?),
            DomainTag::Optics => DomainData::Optics(typed(&declared_type, data_value)?),
            DomainTag::Molecule => DomainData::Molecule(typed(&declared_type, data_value)?),
            DomainTag::Reaction => DomainData::Reaction(typed(&declared_type, data_value)?),
            DomainTag::Apparatus => DomainData::Apparatus(typed(&declared_type, data_value)?),
            DomainTag::Cell => DomainData::Cell(typed(&declared_type, data_value)?),
            DomainTag::ProcessFlow => DomainData::ProcessFlow(typed(&declared_type, data_value)?),
            DomainTag::Climate => DomainData::Climate(typed(&declared_type, data_value)?),
            DomainTag::Generic => DomainData::Generic(typed(&declared_type, data_value)?),
        };

        Ok(Self {
            tag,
            declared_type,
            title,
            data,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }
}

fn typed<T: DeserializeOwned>(declared_type: &str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|source| Error::InvalidData {
        diagram_type: if declared_type.is_empty() {
            "generic".to_string()
        } else {
            declared_type.to_string()
        },
        source,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
