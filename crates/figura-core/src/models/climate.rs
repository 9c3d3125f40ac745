use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateData {
    #[serde(alias = "location", alias = "name")]
    pub city: Option<String>,
    pub months: Vec<String>,
    /// Monthly mean temperature; `null` entries become `NaN` gaps.
    #[serde(alias = "temp", alias = "temperatures", deserialize_with = "series")]
    pub temperature: Vec<f64>,
    #[serde(alias = "precip", alias = "rainfall", deserialize_with = "series")]
    pub precipitation: Vec<f64>,
}

fn series<'de, D>(de: D) -> Result<Vec<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<Option<f64>>::deserialize(de)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

impl ClimateData {
    /// Number of month bands: the month labels when given, else the longest series.
    pub fn month_count(&self) -> usize {
        if !self.months.is_empty() {
            return self.months.len();
        }
        self.temperature.len().max(self.precipitation.len())
    }

    pub fn month_label(&self, i: usize) -> String {
        self.months
            .get(i)
            .cloned()
            .unwrap_or_else(|| (i + 1).to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.month_count() == 0
            || (self.temperature.iter().all(|v| !v.is_finite())
                && self.precipitation.iter().all(|v| !v.is_finite()))
    }
}
