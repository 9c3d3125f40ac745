use crate::{Error, Result};
use serde_json::{Map, Value};

/// Loosely typed render configuration.
///
/// Values are addressed with dotted paths (`canvas.optics.width`). Renderers never read this
/// directly; `figura-render` turns it into typed settings once per driver.
#[derive(Debug, Clone, PartialEq)]
pub struct FiguraConfig(Value);

impl Default for FiguraConfig {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl FiguraConfig {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses a YAML (or JSON) document into a config object.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let parsed: Option<Value> = match text.trim() {
            "" => None,
            body => serde_yaml::from_str(body).map_err(|e| Error::Config {
                message: e.to_string(),
            })?,
        };
        match parsed {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(map @ Value::Object(_)) => Ok(Self(map)),
            Some(other) => Err(Error::Config {
                message: format!("expected a mapping at the top level, found {other}"),
            }),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        dotted_path
            .split('.')
            .try_fold(&self.0, |node, key| node.as_object()?.get(key))
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    /// Numeric lookup; non-finite values are treated as absent.
    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?
            .as_f64()
            .filter(|v| v.is_finite())
    }

    /// Writes `value` at `dotted_path`. Scalars met along the way (the root included) are
    /// replaced by objects.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let keys: Vec<&str> = dotted_path.split('.').collect();
        insert_at(&mut self.0, &keys, value);
    }

    /// Overlays `other` onto this config. Objects merge key by key; anything else replaces.
    pub fn deep_merge(&mut self, other: &Value) {
        overlay(&mut self.0, other);
    }
}

fn insert_at(node: &mut Value, keys: &[&str], value: Value) {
    let Some((first, rest)) = keys.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        insert_at(child, rest, value);
    }
}

fn overlay(target: &mut Value, patch: &Value) {
    if let (Some(target_map), Some(patch_map)) = (target.as_object_mut(), patch.as_object()) {
        for (key, patch_value) in patch_map {
            match target_map.get_mut(key) {
                Some(existing) => overlay(existing, patch_value),
                None => {
                    target_map.insert(key.clone(), patch_value.clone());
                }
            }
        }
        return;
    }
    *target = patch.clone();
}
