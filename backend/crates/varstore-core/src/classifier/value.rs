//! Write-time classification from the runtime shape of a value.

use varstore_commons::{VariableType, VariableValue};

type Rule = fn(&VariableValue, Option<VariableType>) -> Option<VariableType>;

/// Ordered rules; the first answer wins.
///
/// Distributed and geospatial values always take their own variant. Otherwise
/// an explicit tag governs, and only untagged values fall back to their shape.
pub const RULES: [(&str, Rule); 4] = [
    ("distributed_value", distributed_value),
    ("geospatial_value", geospatial_value),
    ("explicit_tag", explicit_tag),
    ("value_shape", value_shape),
];

fn distributed_value(value: &VariableValue, _: Option<VariableType>) -> Option<VariableType> {
    matches!(value, VariableValue::Distributed(_)).then_some(VariableType::Distributed)
}

fn geospatial_value(value: &VariableValue, _: Option<VariableType>) -> Option<VariableType> {
    matches!(value, VariableValue::Geo(_)).then_some(VariableType::Geospatial)
}

fn explicit_tag(_: &VariableValue, explicit: Option<VariableType>) -> Option<VariableType> {
    explicit
}

fn value_shape(value: &VariableValue, _: Option<VariableType>) -> Option<VariableType> {
    let variable_type = match value {
        VariableValue::Frame(_) => VariableType::Tabular,
        VariableValue::Batch(_) => VariableType::TabularAltEngine,
        VariableValue::SparseMatrix(_) | VariableValue::SparseMatrices(_) => {
            VariableType::SparseMatrix
        }
        VariableValue::Model(_) => VariableType::ModelArtifact,
        _ => VariableType::Generic,
    };
    Some(variable_type)
}

/// Variant a value is written as, given the tag the variable already carries.
pub fn classify_value(value: &VariableValue, explicit: Option<VariableType>) -> VariableType {
    RULES
        .iter()
        .find_map(|(_, rule)| rule(value, explicit))
        .unwrap_or(VariableType::Generic)
}
