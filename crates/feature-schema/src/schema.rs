//! Feature Schema Definition

use crate::error::SchemaMismatchError;
use crate::vector::{FeatureRow, FeatureVector};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Number of features the models were fitted on
pub const FEATURE_DIMENSION: usize = 28;

/// Presentation grouping used by intake forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    /// Session length and pre/post vital signs
    SessionVitals,
    /// Dialysis machine parameters
    MachineParameters,
    /// Laboratory biochemistry
    Biochemistry,
}

/// A single named measurement and its display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub unit: &'static str,
    pub group: FeatureGroup,
}

const fn spec(name: &'static str, unit: &'static str, group: FeatureGroup) -> FeatureSpec {
    FeatureSpec { name, unit, group }
}

use FeatureGroup::{Biochemistry, MachineParameters, SessionVitals};

/// Features in training order
pub static FEATURES: [FeatureSpec; FEATURE_DIMENSION] = [
    spec("Dialysis session length", "hour", SessionVitals),
    spec("Pre-Dialysis Weight", "kg", SessionVitals),
    spec("Pre-Dialysis SBP", "mmHg", SessionVitals),
    spec("Pre-Dialysis DBP", "mmHg", SessionVitals),
    spec("Pre-Dialysis Pulse", "bpm", SessionVitals),
    spec("Post-Dialysis Weight", "kg", SessionVitals),
    spec("Post-Dialysis SBP", "mmHg", SessionVitals),
    spec("Post-Dialysis DBP", "mmHg", SessionVitals),
    spec("Post-Dialysis Pulse", "bpm", SessionVitals),
    spec("Total Blood Volume", "mL", MachineParameters),
    spec("Total UV per session", "mL", MachineParameters),
    spec("Ultrafiltration Rate", "mL /kg /h", MachineParameters),
    spec("Ultrafiltration Weight Ratio", "%", MachineParameters),
    spec("Mean Blood Flow", "mL/min", MachineParameters),
    spec("Mean Arterial Pressure", "mmHg", MachineParameters),
    spec("Mean Venous Pressure", "mmHg", MachineParameters),
    spec("Mean TMP", "mmHg", MachineParameters),
    spec("Mean Dialysate Flow Rate", "mL/min", MachineParameters),
    spec("Mean Dialysate Temperature", "°C", MachineParameters),
    spec("Mean Conductivity", "mS/cm", MachineParameters),
    spec("ProBNP", "pg/mL", Biochemistry),
    spec("Hemoglobin", "g/dL", Biochemistry),
    spec("Pre-Dialysis Creatinine", "µmol/L", Biochemistry),
    spec("Total Bilirubin", "µmol/L", Biochemistry),
    spec("Hs-CRP", "mg/L", Biochemistry),
    spec("GFR", "mL/min/1.73 m²", Biochemistry),
    spec("PTH", "pg/mL", Biochemistry),
    spec("nPCR", "g/kg/day", Biochemistry),
];

/// Accessors over the fixed feature table
pub struct FeatureSchema;

impl FeatureSchema {
    /// All features in training order
    pub fn features() -> &'static [FeatureSpec] {
        &FEATURES
    }

    /// Feature names in training order
    pub fn names() -> impl Iterator<Item = &'static str> {
        FEATURES.iter().map(|f| f.name)
    }

    pub fn len() -> usize {
        FEATURE_DIMENSION
    }

    /// Position of `name` in the training order
    pub fn index_of(name: &str) -> Option<usize> {
        FEATURES.iter().position(|f| f.name == name)
    }

    /// Display unit for `name`
    pub fn unit_of(name: &str) -> Option<&'static str> {
        FEATURES.iter().find(|f| f.name == name).map(|f| f.unit)
    }

    /// Arrange a caller-supplied mapping into training order.
    ///
    /// The mapping's key set must equal the schema's name set exactly; insertion
    /// order of the mapping is irrelevant.
    pub fn order(vector: &FeatureVector) -> Result<FeatureRow, SchemaMismatchError> {
        let missing: Vec<String> = FEATURES
            .iter()
            .filter(|f| vector.get(f.name).is_none())
            .map(|f| f.name.to_string())
            .collect();

        let unexpected: BTreeSet<&str> = vector
            .names()
            .filter(|name| Self::index_of(name).is_none())
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            debug!(
                "Schema mismatch: {} missing, {} unexpected",
                missing.len(),
                unexpected.len()
            );
            return Err(SchemaMismatchError {
                missing,
                unexpected: unexpected.into_iter().map(str::to_string).collect(),
            });
        }

        let mut values = [0.0; FEATURE_DIMENSION];
        for (slot, feature) in values.iter_mut().zip(FEATURES.iter()) {
            // presence checked above
            *slot = vector.get(feature.name).unwrap_or_default();
        }
        Ok(FeatureRow::new(values))
    }
}
