//! Conversions between model instances, plain mappings, and JSON text.

use crate::catalog::Catalog;
use models_core::{Mapping, ModelSchema, PrimitiveKind, TypeDescriptor, Value};

/// Replaces nested model instances by plain dicts, recursively.
pub fn materialize(value: &Value) -> Value {
    match value {
        Value::Model(instance) => Value::from(materialize_mapping(&instance.fields)),
        Value::List(items) => Value::List(items.iter().map(materialize).collect()),
        Value::Tuple(items) => Value::Tuple(items.iter().map(materialize).collect()),
        Value::Set(items) => Value::Set(items.iter().map(materialize).collect()),
        Value::Dict(pairs) => Value::Dict(
            pairs
                .iter()
                .map(|(k, v)| (materialize(k), materialize(v)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

pub(crate) fn materialize_mapping(fields: &Mapping) -> Mapping {
    fields
        .iter()
        .map(|(name, value)| (name, materialize(value)))
        .collect()
}

/// Reads a JSON object as field values, guided by the model's descriptors.
///
/// JSON only has arrays and string keys; the descriptors decide where an
/// array is a tuple or a set and where an object key is a number.
pub(crate) fn decode_fields(
    catalog: &Catalog,
    schema: &ModelSchema,
    object: serde_json::Map<String, serde_json::Value>,
) -> Mapping {
    object
        .into_iter()
        .map(|(name, json)| {
            let value = match schema.field(&name) {
                Some(field) => decode(catalog, &field.descriptor, json),
                None => Value::from(json),
            };
            (name, value)
        })
        .collect()
}

fn decode(catalog: &Catalog, descriptor: &TypeDescriptor, json: serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match (descriptor, json) {
        (_, Json::Null) => Value::None,
        (TypeDescriptor::Optional(_) | TypeDescriptor::Union(_), json) => {
            let plain = Value::from(json.clone());
            match descriptor
                .alternatives()
                .into_iter()
                .find(|alt| alt.matches_shape(&plain))
            {
                Some(alt) => decode(catalog, alt, json),
                None => plain,
            }
        }
        (TypeDescriptor::List(elem), Json::Array(items)) => Value::List(
            items
                .into_iter()
                .map(|item| decode(catalog, elem, item))
                .collect(),
        ),
        (TypeDescriptor::Set(elem), Json::Array(items)) => {
            Value::set(items.into_iter().map(|item| decode(catalog, elem, item)))
        }
        (TypeDescriptor::Tuple(elems), Json::Array(items)) => Value::Tuple(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match elems.get(i) {
                    Some(elem) => decode(catalog, elem, item),
                    None => Value::from(item),
                })
                .collect(),
        ),
        (TypeDescriptor::Dict(key_type, value_type), Json::Object(map)) => Value::Dict(
            map.into_iter()
                .map(|(key, item)| (decode_key(key_type, key), decode(catalog, value_type, item)))
                .collect(),
        ),
        (TypeDescriptor::ModelRef(model), Json::Object(map)) => match catalog.schema(model) {
            Some(schema) => Value::from(decode_fields(catalog, schema, map)),
            None => Value::from(Json::Object(map)),
        },
        (_, json) => Value::from(json),
    }
}

fn decode_key(key_type: &TypeDescriptor, key: String) -> Value {
    let parsed = match key_type {
        TypeDescriptor::Primitive(PrimitiveKind::Int) => key.parse::<i64>().ok().map(Value::Int),
        TypeDescriptor::Primitive(PrimitiveKind::Float) => {
            key.parse::<f64>().ok().map(Value::Float)
        }
        TypeDescriptor::Primitive(PrimitiveKind::Bool) => match key.as_str() {
            "true" | "True" => Some(Value::Bool(true)),
            "false" | "False" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    parsed.unwrap_or(Value::Str(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use models_core::ModelValue;

    #[test]
    fn test_materialize_nested_models() {
        let inner = Value::from(ModelValue::new("Address", Mapping::new().with("city", "Rome")));
        let value = Value::list([inner]);
        let plain = materialize(&value);
        assert_eq!(plain, Value::list([Value::dict([("city", "Rome")])]));
    }

    #[test]
    fn test_decode_key_by_type() {
        assert_eq!(decode_key(&TypeDescriptor::int(), "7".into()), Value::Int(7));
        assert_eq!(decode_key(&TypeDescriptor::int(), "x".into()), Value::from("x"));
        assert_eq!(decode_key(&TypeDescriptor::string(), "7".into()), Value::from("7"));
    }
}
