//! Type matching against a field's [`TypeDescriptor`].
//!
//! Matching checks the value's shape recursively and coerces where the shape
//! allows: lists into tuples and sets, mappings and JSON object text into
//! nested model instances. Element failures name the offending index or key.

use crate::catalog::Catalog;
use crate::walker;
use models_core::{
    ErrorKind, TypeDescriptor, ValidationError, Value, value_text,
};

type Matched = std::result::Result<Value, Vec<ValidationError>>;

/// Position of an element inside a container value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Element<'v> {
    Index(usize),
    TupleItem(usize),
    SetItem(usize),
    Key(&'v Value),
}

impl Element<'_> {
    pub(crate) fn path(&self, parent: &str) -> String {
        match self {
            Element::Index(i) | Element::TupleItem(i) | Element::SetItem(i) => {
                format!("{parent}[{i}]")
            }
            Element::Key(key) => format!("{parent}[{}]", key.repr()),
        }
    }

    fn label(&self) -> String {
        match self {
            Element::Index(i) => format!("Item at index {i}"),
            Element::TupleItem(i) => format!("Tuple item at index {i}"),
            Element::SetItem(_) => "Set item".to_string(),
            Element::Key(key) => format!("Dict value for key '{key}'"),
        }
    }

    /// Message prefix for failures raised inside a nested model element.
    pub(crate) fn nested_prefix(&self) -> String {
        match self {
            Element::Index(i) | Element::TupleItem(i) | Element::SetItem(i) => {
                format!("Item at index {i}: ")
            }
            Element::Key(key) => format!("Value for key '{key}': "),
        }
    }
}

fn type_pair(descriptor: &TypeDescriptor) -> Vec<(String, String)> {
    vec![("type".to_string(), descriptor.to_string())]
}

/// Matches values against descriptors at a given nesting depth.
pub(crate) struct Matcher<'c> {
    pub(crate) catalog: &'c Catalog,
    pub(crate) depth: usize,
}

impl<'c> Matcher<'c> {
    pub(crate) fn new(catalog: &'c Catalog, depth: usize) -> Self {
        Self { catalog, depth }
    }

    /// Matches `value` against `descriptor`, returning the coerced value.
    pub(crate) fn match_value(&self, descriptor: &TypeDescriptor, value: &Value, path: &str) -> Matched {
        match descriptor {
            TypeDescriptor::Primitive(_) => {
                if descriptor.matches(value) {
                    Ok(value.clone())
                } else {
                    Err(vec![ValidationError::type_mismatch(
                        path,
                        &descriptor.name(),
                        value,
                    )])
                }
            }
            TypeDescriptor::Optional(_) | TypeDescriptor::Union(_) => {
                self.match_union(descriptor, value, path)
            }
            TypeDescriptor::List(elem) => match value {
                Value::List(items) => {
                    let items = self.match_items(elem, items, path, Element::Index)?;
                    Ok(Value::List(items))
                }
                _ => Err(self.mismatch(descriptor, value, path)),
            },
            TypeDescriptor::Set(elem) => match value {
                Value::Set(items) | Value::List(items) => {
                    let items = self.match_items(elem, items, path, Element::SetItem)?;
                    Ok(Value::set(items))
                }
                _ => Err(self.mismatch(descriptor, value, path)),
            },
            TypeDescriptor::Tuple(elems) => match value {
                Value::Tuple(items) | Value::List(items) => self.match_tuple(descriptor, elems, items, value, path),
                _ => Err(self.mismatch(descriptor, value, path)),
            },
            TypeDescriptor::Dict(key_type, value_type) => match value {
                Value::Dict(pairs) => self.match_dict(key_type, value_type, pairs, path),
                _ => Err(self.mismatch(descriptor, value, path)),
            },
            TypeDescriptor::ModelRef(model) => walker::coerce_model(self, model, value, path, ""),
        }
    }

    fn mismatch(&self, descriptor: &TypeDescriptor, value: &Value, path: &str) -> Vec<ValidationError> {
        vec![ValidationError::type_mismatch(path, &descriptor.name(), value)
            .with_expected(type_pair(descriptor))]
    }

    fn match_union(&self, descriptor: &TypeDescriptor, value: &Value, path: &str) -> Matched {
        if value.is_none() && descriptor.is_nullable() {
            return Ok(Value::None);
        }

        let alternatives = descriptor.alternatives();
        if let [only] = alternatives.as_slice() {
            return self.match_value(only, value, path);
        }

        // Alternatives are tried in declaration order and the first accepted one
        // wins. If none accepts, the first one with the right outer shape
        // reports its own failures.
        let mut shaped_failure = None;
        for alt in &alternatives {
            match self.match_value(alt, value, path) {
                Ok(matched) => return Ok(matched),
                Err(errors) => {
                    if shaped_failure.is_none() && alt.matches_shape(value) {
                        shaped_failure = Some(errors);
                    }
                }
            }
        }
        if let Some(errors) = shaped_failure {
            return Err(errors);
        }

        let names: Vec<String> = alternatives.iter().map(|alt| alt.to_string()).collect();
        Err(vec![
            ValidationError::new(
                path,
                ErrorKind::TypeMismatch,
                format!(
                    "Expected one of types [{}], got {} with value: {}",
                    names.join(", "),
                    value.type_name(),
                    value_text(value)
                ),
            )
            .with_received(value)
            .with_expected(type_pair(descriptor)),
        ])
    }

    fn match_items<'v>(
        &self,
        elem: &TypeDescriptor,
        items: &'v [Value],
        path: &str,
        position: fn(usize) -> Element<'v>,
    ) -> std::result::Result<Vec<Value>, Vec<ValidationError>> {
        let mut matched = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (i, item) in items.iter().enumerate() {
            match self.match_element(elem, item, path, position(i)) {
                Ok(value) => matched.push(value),
                Err(errs) => errors.extend(errs),
            }
        }
        if errors.is_empty() {
            Ok(matched)
        } else {
            Err(errors)
        }
    }

    fn match_tuple(
        &self,
        descriptor: &TypeDescriptor,
        elems: &[TypeDescriptor],
        items: &[Value],
        value: &Value,
        path: &str,
    ) -> Matched {
        if elems.len() != items.len() {
            return Err(vec![
                ValidationError::new(
                    path,
                    ErrorKind::ArityMismatch,
                    format!(
                        "Expected tuple of length {}, got tuple of length {} with value: {}",
                        elems.len(),
                        items.len(),
                        value_text(value)
                    ),
                )
                .with_received(value)
                .with_expected(type_pair(descriptor)),
            ]);
        }

        let mut matched = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (i, (elem, item)) in elems.iter().zip(items).enumerate() {
            match self.match_element(elem, item, path, Element::TupleItem(i)) {
                Ok(value) => matched.push(value),
                Err(errs) => errors.extend(errs),
            }
        }
        if errors.is_empty() {
            Ok(Value::Tuple(matched))
        } else {
            Err(errors)
        }
    }

    fn match_dict(
        &self,
        key_type: &TypeDescriptor,
        value_type: &TypeDescriptor,
        pairs: &[(Value, Value)],
        path: &str,
    ) -> Matched {
        let mut matched = Vec::with_capacity(pairs.len());
        let mut errors = Vec::new();
        for (key, item) in pairs {
            if !key_type.matches(key) {
                errors.push(
                    ValidationError::new(
                        path,
                        ErrorKind::TypeMismatch,
                        format!(
                            "Dict key expected to be {key_type}, got {} with value: {}",
                            key.type_name(),
                            value_text(key)
                        ),
                    )
                    .with_received(key)
                    .with_expected(type_pair(key_type)),
                );
                continue;
            }
            match self.match_element(value_type, item, path, Element::Key(key)) {
                Ok(value) => matched.push((key.clone(), value)),
                Err(errs) => errors.extend(errs),
            }
        }
        if errors.is_empty() {
            Ok(Value::Dict(matched))
        } else {
            Err(errors)
        }
    }

    fn match_element(
        &self,
        elem: &TypeDescriptor,
        item: &Value,
        parent: &str,
        element: Element<'_>,
    ) -> Matched {
        let path = element.path(parent);

        if item.is_none() {
            if elem.is_nullable() {
                return Ok(Value::None);
            }
            return Err(vec![
                ValidationError::new(
                    path,
                    ErrorKind::NoneNotAllowed,
                    format!("{} cannot be None", element.label()),
                )
                .with_received(item)
                .with_expected(type_pair(elem)),
            ]);
        }

        match elem {
            TypeDescriptor::ModelRef(model) => {
                walker::coerce_model(self, model, item, &path, &element.nested_prefix())
            }
            TypeDescriptor::Primitive(_) if !elem.matches(item) => Err(vec![
                ValidationError::new(
                    path,
                    ErrorKind::TypeMismatch,
                    format!(
                        "{} expected to be {elem}, got {} with value: {}",
                        element.label(),
                        item.type_name(),
                        value_text(item)
                    ),
                )
                .with_received(item)
                .with_expected(type_pair(elem)),
            ]),
            TypeDescriptor::Primitive(_) => Ok(item.clone()),
            _ => self.match_value(elem, item, &path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models_core::{Mapping, ModelBuilder, ModelSchema};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn address() -> ModelSchema {
        ModelBuilder::new("Address")
            .plain_field("street", TypeDescriptor::string())
            .plain_field("city", TypeDescriptor::string())
            .build()
            .unwrap()
    }

    fn tag() -> ModelSchema {
        ModelBuilder::new("Tag")
            .plain_field("label", TypeDescriptor::string())
            .build()
            .unwrap()
    }

    fn catalog() -> Arc<Catalog> {
        Catalog::builder().model(address()).model(tag()).build().unwrap()
    }

    fn address_value(city: impl Into<Value>) -> Value {
        Value::from(Mapping::new().with("street", "Main St").with("city", city))
    }

    fn descriptor(text: &str) -> TypeDescriptor {
        text.parse().unwrap()
    }

    fn run(descriptor_text: &str, value: &Value) -> Matched {
        let catalog = catalog();
        Matcher::new(&catalog, 0).match_value(&descriptor(descriptor_text), value, "x")
    }

    #[test]
    fn test_union_accepts_later_model_alternative() {
        let value = Value::from(Mapping::new().with("label", "red"));
        let matched = run("Union[Address, Tag]", &value).unwrap();
        assert_eq!(matched.as_model().map(|m| m.model.as_str()), Some("Tag"));
    }

    #[test]
    fn test_union_falls_through_model_to_dict() {
        let value = Value::dict([("k", "v")]);
        let matched = run("Union[Address, Dict[str, str]]", &value).unwrap();
        assert_eq!(matched, value);
        assert!(matched.as_model().is_none());
    }

    #[test]
    fn test_union_keeps_object_text_as_str() {
        let value = Value::from(r#"{"k": "v"}"#);
        assert_eq!(run("Union[Address, str]", &value).unwrap(), value);
    }

    #[test]
    fn test_union_prefers_declaration_order() {
        let value = address_value("Rome");
        let matched = run("Union[Dict[str, str], Address]", &value).unwrap();
        assert!(matched.as_model().is_none());

        let matched = run("Union[Address, Dict[str, str]]", &value).unwrap();
        assert_eq!(matched.as_model().map(|m| m.model.as_str()), Some("Address"));
    }

    #[test]
    fn test_union_reports_failure_of_shaped_alternative() {
        let errors = run("Union[int, Address]", &address_value(5)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "x.city");
        assert_eq!(errors[0].kind, ErrorKind::NestedValidationFailure);
        assert_eq!(errors[0].nested_kind, Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_union_mismatch_lists_alternatives() {
        let errors = run("Union[int, str]", &Value::Float(1.5)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "x");
        assert_eq!(errors[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(
            errors[0].message,
            "Expected one of types [int, str], got float with value: 1.5"
        );
        assert_eq!(
            errors[0].expected,
            vec![("type".to_string(), "Union[int, str]".to_string())]
        );
    }

    #[test]
    fn test_dict_key_mismatch() {
        let errors = run("Dict[int, str]", &Value::dict([("a", "b")])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "x");
        assert_eq!(errors[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(
            errors[0].message,
            "Dict key expected to be int, got str with value: a"
        );
    }

    #[test]
    fn test_dict_of_models_failure_path() {
        let value = Value::dict([("home", address_value(5))]);
        let errors = run("Dict[str, Address]", &value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "x['home'].city");
        assert_eq!(
            errors[0].message,
            "Value for key 'home': Expected type str, got int with value: 5"
        );
    }

    #[test]
    fn test_tuple_item_mismatch_names_position() {
        let value = Value::list([Value::Int(1), Value::Int(2)]);
        let errors = run("Tuple[int, str]", &value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "x[1]");
        assert_eq!(
            errors[0].message,
            "Tuple item at index 1 expected to be str, got int with value: 2"
        );

        let matched = run("Tuple[int, str]", &Value::list([Value::Int(1), Value::from("a")])).unwrap();
        assert_eq!(matched, Value::tuple([Value::Int(1), Value::from("a")]));
    }

    #[test]
    fn test_set_of_models() {
        let value = Value::list([address_value("Rome"), address_value(7)]);
        let errors = run("Set[Address]", &value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "x[1].city");
        assert!(errors[0].message.starts_with("Item at index 1: Expected type str"));

        let matched = run("Set[Address]", &Value::list([address_value("Rome")])).unwrap();
        let Value::Set(items) = matched else {
            panic!("expected a set");
        };
        assert_eq!(items[0].as_model().map(|m| m.model.as_str()), Some("Address"));
    }

    #[test]
    fn test_none_element_rejected_unless_nullable() {
        let errors = run("List[int]", &Value::list([Value::Int(1), Value::None])).unwrap_err();
        assert_eq!(errors[0].path, "x[1]");
        assert_eq!(errors[0].kind, ErrorKind::NoneNotAllowed);
        assert_eq!(errors[0].message, "Item at index 1 cannot be None");

        assert!(run("List[Optional[int]]", &Value::list([Value::Int(1), Value::None])).is_ok());
    }
}
