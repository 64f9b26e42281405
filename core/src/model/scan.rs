use crate::model::attributes::Attributes;
use crate::prelude::{MergeError, MergeResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named physical quantity sampled on a rays x bins grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub quantity: String,
    pub data: Array2<f64>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Parameter {
    pub fn new(quantity: impl Into<String>, data: Array2<f64>) -> Self {
        Self {
            quantity: quantity.into(),
            data,
            attributes: Attributes::new(),
        }
    }
}

/// One sweep at a fixed elevation angle.
///
/// Dates are `YYYYMMDD` and times `HHMMSS`, as in ODIM `what/date` and
/// `what/time`. `beamw_v` is absent for radars that only report a single
/// beamwidth; copies skip it in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarScan {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
    pub beamwidth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beamw_v: Option<f64>,
    /// Elevation angle in degrees.
    pub elangle: f64,
    pub nrays: usize,
    pub nbins: usize,
    pub a1gate: i64,
    pub rscale: f64,
    pub rstart: f64,
    pub source: String,
    pub date: String,
    pub time: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    parameters: BTreeMap<String, Parameter>,
}

impl Default for RadarScan {
    fn default() -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
            height: 0.0,
            beamwidth: 0.0,
            beamw_v: None,
            elangle: 0.0,
            nrays: 0,
            nbins: 0,
            a1gate: 0,
            rscale: 0.0,
            rstart: 0.0,
            source: String::new(),
            date: String::new(),
            time: String::new(),
            start_date: String::new(),
            start_time: String::new(),
            end_date: String::new(),
            end_time: String::new(),
            attributes: Attributes::new(),
            parameters: BTreeMap::new(),
        }
    }
}

impl RadarScan {
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    pub fn number_of_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn has_parameter(&self, quantity: &str) -> bool {
        self.parameters.contains_key(quantity)
    }

    pub fn parameter(&self, quantity: &str) -> Option<&Parameter> {
        self.parameters.get(quantity)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    /// Adds `parameter` under its own quantity name.
    ///
    /// Quantity names are unique within a scan: an existing name is an error,
    /// never a silent replacement.
    pub fn add_parameter(&mut self, parameter: Parameter) -> MergeResult<()> {
        if self.parameters.contains_key(&parameter.quantity) {
            return Err(MergeError::DuplicateQuantity(parameter.quantity));
        }
        self.parameters.insert(parameter.quantity.clone(), parameter);
        Ok(())
    }

    pub fn remove_parameter(&mut self, quantity: &str) -> Option<Parameter> {
        self.parameters.remove(quantity)
    }

    /// Name of the only quantity carried by a single-parameter scan.
    pub fn single_quantity(&self) -> MergeResult<&str> {
        let mut names = self.parameters.keys();
        match (names.next(), names.next()) {
            (Some(name), None) => Ok(name.as_str()),
            _ => Err(MergeError::QuantityCount(self.parameters.len())),
        }
    }

    /// Quantity used to qualify power attributes when a scan is folded into
    /// another one: the last name in quantity order.
    pub fn dominant_quantity(&self) -> Option<&str> {
        self.parameters.keys().next_back().map(String::as_str)
    }
}
