//! Structural type descriptors for model fields.
//!
//! A [`TypeDescriptor`] describes the value shapes a field accepts. It has a
//! textual form (`int`, `Optional[str]`, `List[Address]`, `Dict[str, int]`,
//! `Tuple[int, str]`, `Set[int]`, `Union[int, str]`) used by declaration files
//! and diagnostics, and it round-trips through that form.

use crate::error::{ModelError, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leaf type of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Any,
    None,
    Bool,
    Int,
    Float,
    Str,
}

impl PrimitiveKind {
    /// Resolves a primitive type name, accepting the common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Any" | "any" => Some(PrimitiveKind::Any),
            "None" | "NoneType" | "null" => Some(PrimitiveKind::None),
            "bool" | "boolean" => Some(PrimitiveKind::Bool),
            "int" | "integer" | "int64" => Some(PrimitiveKind::Int),
            "float" | "double" | "float64" | "number" => Some(PrimitiveKind::Float),
            "str" | "string" => Some(PrimitiveKind::Str),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Any => "Any",
            PrimitiveKind::None => "None",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Str => "str",
        }
    }
}

/// Structural description of the values a field accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// Equivalent to `Union[T, None]`.
    Optional(Box<TypeDescriptor>),
    List(Box<TypeDescriptor>),
    Dict(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Tuple(Vec<TypeDescriptor>),
    Set(Box<TypeDescriptor>),
    Union(Vec<TypeDescriptor>),
    /// Reference to another registered model type, by name.
    ModelRef(String),
}

impl TypeDescriptor {
    pub fn any() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Any)
    }

    pub fn none() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::None)
    }

    pub fn bool() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Bool)
    }

    pub fn int() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Int)
    }

    pub fn float() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Float)
    }

    pub fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Str)
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(element))
    }

    pub fn set(element: TypeDescriptor) -> Self {
        TypeDescriptor::Set(Box::new(element))
    }

    pub fn dict(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Dict(Box::new(key), Box::new(value))
    }

    pub fn tuple(elements: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Tuple(elements)
    }

    pub fn union(alternatives: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Union(alternatives)
    }

    pub fn model(name: impl Into<String>) -> Self {
        TypeDescriptor::ModelRef(name.into())
    }

    /// Whether `None` is an acceptable value.
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeDescriptor::Primitive(PrimitiveKind::None | PrimitiveKind::Any) => true,
            TypeDescriptor::Optional(_) => true,
            TypeDescriptor::Union(alts) => alts.iter().any(TypeDescriptor::is_nullable),
            _ => false,
        }
    }

    /// The non-`None` alternatives, with nested unions and optionals flattened.
    pub fn alternatives(&self) -> Vec<&TypeDescriptor> {
        match self {
            TypeDescriptor::Optional(inner) => inner.alternatives(),
            TypeDescriptor::Union(alts) => alts
                .iter()
                .filter(|alt| **alt != TypeDescriptor::none())
                .flat_map(TypeDescriptor::alternatives)
                .collect(),
            other => vec![other],
        }
    }

    /// Short name used in "Expected type ..." messages.
    pub fn name(&self) -> String {
        match self {
            TypeDescriptor::Primitive(PrimitiveKind::None) => "NoneType".to_string(),
            TypeDescriptor::Primitive(kind) => kind.as_str().to_string(),
            TypeDescriptor::Optional(inner) => inner.name(),
            TypeDescriptor::List(_) => "list".to_string(),
            TypeDescriptor::Dict(_, _) => "dict".to_string(),
            TypeDescriptor::Tuple(_) => "tuple".to_string(),
            TypeDescriptor::Set(_) => "set".to_string(),
            TypeDescriptor::Union(_) => self.to_string(),
            TypeDescriptor::ModelRef(name) => name.clone(),
        }
    }

    /// Names of every model type referenced anywhere in this descriptor.
    pub fn referenced_models(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_models(&mut names);
        names
    }

    fn collect_models<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeDescriptor::ModelRef(name) => names.push(name),
            TypeDescriptor::Optional(inner)
            | TypeDescriptor::List(inner)
            | TypeDescriptor::Set(inner) => inner.collect_models(names),
            TypeDescriptor::Dict(k, v) => {
                k.collect_models(names);
                v.collect_models(names);
            }
            TypeDescriptor::Tuple(items) | TypeDescriptor::Union(items) => {
                for item in items {
                    item.collect_models(names);
                }
            }
            TypeDescriptor::Primitive(_) => {}
        }
    }

    /// Deep structural match, without any coercion.
    ///
    /// Lists are accepted where tuples and sets are expected, and string-keyed
    /// dicts or JSON object text where a model is expected, since those are
    /// the shapes the matcher coerces. Model fields are not inspected, so a
    /// model reference matching here may still fail nested validation.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeDescriptor::Primitive(kind) => primitive_matches(*kind, value),
            TypeDescriptor::Optional(inner) => value.is_none() || inner.matches(value),
            TypeDescriptor::Union(alts) => alts.iter().any(|alt| alt.matches(value)),
            TypeDescriptor::List(elem) => match value {
                Value::List(items) => items.iter().all(|item| elem.matches(item)),
                _ => false,
            },
            TypeDescriptor::Set(elem) => match value {
                Value::Set(items) | Value::List(items) => items.iter().all(|i| elem.matches(i)),
                _ => false,
            },
            TypeDescriptor::Tuple(elems) => match value {
                Value::Tuple(items) | Value::List(items) => {
                    items.len() == elems.len()
                        && elems.iter().zip(items).all(|(desc, item)| desc.matches(item))
                }
                _ => false,
            },
            TypeDescriptor::Dict(key, val) => match value {
                Value::Dict(pairs) => pairs.iter().all(|(k, v)| key.matches(k) && val.matches(v)),
                _ => false,
            },
            TypeDescriptor::ModelRef(_) => self.matches_shape(value),
        }
    }

    /// Outer-shape match only: container elements are not inspected.
    pub fn matches_shape(&self, value: &Value) -> bool {
        match self {
            TypeDescriptor::Primitive(kind) => primitive_matches(*kind, value),
            TypeDescriptor::Optional(inner) => value.is_none() || inner.matches_shape(value),
            TypeDescriptor::Union(alts) => alts.iter().any(|alt| alt.matches_shape(value)),
            TypeDescriptor::List(_) => matches!(value, Value::List(_)),
            TypeDescriptor::Set(_) => matches!(value, Value::Set(_) | Value::List(_)),
            TypeDescriptor::Tuple(_) => matches!(value, Value::Tuple(_) | Value::List(_)),
            TypeDescriptor::Dict(_, _) => matches!(value, Value::Dict(_)),
            TypeDescriptor::ModelRef(name) => match value {
                Value::Model(m) => m.model == *name,
                Value::Dict(pairs) => pairs.iter().all(|(k, _)| matches!(k, Value::Str(_))),
                Value::Str(text) => {
                    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(text)
                        .is_ok()
                }
                _ => false,
            },
        }
    }
}

fn primitive_matches(kind: PrimitiveKind, value: &Value) -> bool {
    match kind {
        PrimitiveKind::Any => true,
        PrimitiveKind::None => value.is_none(),
        PrimitiveKind::Bool => matches!(value, Value::Bool(_)),
        PrimitiveKind::Int => matches!(value, Value::Int(_)),
        PrimitiveKind::Float => matches!(value, Value::Float(_) | Value::Int(_)),
        PrimitiveKind::Str => matches!(value, Value::Str(_)),
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => f.write_str(kind.as_str()),
            TypeDescriptor::Optional(inner) => write!(f, "Optional[{inner}]"),
            TypeDescriptor::List(elem) => write!(f, "List[{elem}]"),
            TypeDescriptor::Dict(k, v) => write!(f, "Dict[{k}, {v}]"),
            TypeDescriptor::Tuple(items) => write!(f, "Tuple[{}]", join(items)),
            TypeDescriptor::Set(elem) => write!(f, "Set[{elem}]"),
            TypeDescriptor::Union(alts) => write!(f, "Union[{}]", join(alts)),
            TypeDescriptor::ModelRef(name) => f.write_str(name),
        }
    }
}

fn join(items: &[TypeDescriptor]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for TypeDescriptor {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = DescriptorParser { input: s, pos: 0 };
        let descriptor = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos < s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(descriptor)
    }
}

impl TryFrom<String> for TypeDescriptor {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TypeDescriptor> for String {
    fn from(descriptor: TypeDescriptor) -> Self {
        descriptor.to_string()
    }
}

struct DescriptorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, reason: impl Into<String>) -> ModelError {
        ModelError::InvalidTypeDescriptor {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn ident(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let ident = &self.input[start..self.pos];
        match ident.chars().next() {
            Some(c) if c.is_alphabetic() || c == '_' => Ok(ident),
            _ => Err(self.error(format!("expected a type name at position {start}"))),
        }
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();

        let args = if self.peek() == Some('[') {
            self.pos += 1;
            let mut args = vec![self.parse_type()?];
            loop {
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => {
                        self.pos += 1;
                        args.push(self.parse_type()?);
                    }
                    Some(']') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or ']'")),
                }
            }
            Some(args)
        } else {
            None
        };

        self.build(name, args)
    }

    fn build(&self, name: &str, args: Option<Vec<TypeDescriptor>>) -> Result<TypeDescriptor> {
        if let Some(kind) = PrimitiveKind::from_name(name) {
            return match args {
                None => Ok(TypeDescriptor::Primitive(kind)),
                Some(_) => Err(self.error(format!("'{name}' takes no type arguments"))),
            };
        }

        match name {
            "List" | "list" => Ok(TypeDescriptor::list(self.single(name, args)?)),
            "Set" | "set" => Ok(TypeDescriptor::set(self.single(name, args)?)),
            "Optional" => match args {
                Some(mut args) if args.len() == 1 => Ok(TypeDescriptor::optional(args.remove(0))),
                _ => Err(self.error("Optional takes exactly one type argument")),
            },
            "Dict" | "dict" => match args {
                None => Ok(TypeDescriptor::dict(
                    TypeDescriptor::any(),
                    TypeDescriptor::any(),
                )),
                Some(args) if args.len() == 2 => {
                    let mut args = args.into_iter();
                    match (args.next(), args.next()) {
                        (Some(k), Some(v)) => Ok(TypeDescriptor::dict(k, v)),
                        _ => Err(self.error("Dict takes a key and a value type")),
                    }
                }
                Some(_) => Err(self.error("Dict takes a key and a value type")),
            },
            "Tuple" | "tuple" => match args {
                Some(args) => Ok(TypeDescriptor::Tuple(args)),
                None => Err(self.error("Tuple requires its element types")),
            },
            "Union" => match args {
                Some(args) => Ok(TypeDescriptor::Union(args)),
                None => Err(self.error("Union requires at least one alternative")),
            },
            model => match args {
                None => Ok(TypeDescriptor::ModelRef(model.to_string())),
                Some(_) => Err(self.error(format!("model type '{model}' takes no type arguments"))),
            },
        }
    }

    fn single(&self, name: &str, args: Option<Vec<TypeDescriptor>>) -> Result<TypeDescriptor> {
        match args {
            None => Ok(TypeDescriptor::any()),
            Some(mut args) if args.len() == 1 => Ok(args.remove(0)),
            Some(_) => Err(self.error(format!("{name} takes exactly one type argument"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Mapping, ModelValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_nested_descriptor() {
        let descriptor: TypeDescriptor = "Dict[str, List[Optional[int]]]".parse().unwrap();
        assert_eq!(
            descriptor,
            TypeDescriptor::dict(
                TypeDescriptor::string(),
                TypeDescriptor::list(TypeDescriptor::optional(TypeDescriptor::int()))
            )
        );
        assert_eq!(descriptor.to_string(), "Dict[str, List[Optional[int]]]");
    }

    #[test]
    fn test_parse_aliases_and_model_refs() {
        assert_eq!("string".parse::<TypeDescriptor>().unwrap(), TypeDescriptor::string());
        assert_eq!(
            "List[Address]".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::list(TypeDescriptor::model("Address"))
        );
        assert_eq!(
            "list".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::list(TypeDescriptor::any())
        );
    }

    #[test]
    fn test_parse_errors() {
        for input in ["", "List[int", "Optional[int, str]", "int[str]", "Tuple", "Dict[int]"] {
            let err = input.parse::<TypeDescriptor>().unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidTypeDescriptor { .. }),
                "input {input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_optional_is_union_with_none() {
        let optional = TypeDescriptor::optional(TypeDescriptor::int());
        let union = TypeDescriptor::union(vec![TypeDescriptor::int(), TypeDescriptor::none()]);

        assert!(optional.is_nullable());
        assert!(union.is_nullable());
        assert_eq!(optional.alternatives(), union.alternatives());
        for value in [Value::None, Value::Int(3), Value::from("x")] {
            assert_eq!(optional.matches(&value), union.matches(&value));
        }
    }

    #[test]
    fn test_structural_matching() {
        assert!(TypeDescriptor::float().matches(&Value::Int(3)));
        assert!(!TypeDescriptor::int().matches(&Value::Bool(true)));
        assert!(TypeDescriptor::tuple(vec![TypeDescriptor::int(), TypeDescriptor::string()])
            .matches(&Value::list([Value::Int(1), Value::from("a")])));
        assert!(!TypeDescriptor::list(TypeDescriptor::int()).matches(&Value::list(["a"])));
        assert!(TypeDescriptor::list(TypeDescriptor::int()).matches_shape(&Value::list(["a"])));

        let address = TypeDescriptor::model("Address");
        assert!(address.matches(&Value::from(ModelValue::new("Address", Mapping::new()))));
        assert!(!address.matches(&Value::from(ModelValue::new("Person", Mapping::new()))));
        assert!(address.matches(&Value::from("{\"city\": \"Rome\"}")));
        assert!(!address.matches(&Value::Int(1)));
    }

    #[test]
    fn test_referenced_models() {
        let descriptor: TypeDescriptor = "Union[List[Address], Dict[str, Person]]".parse().unwrap();
        assert_eq!(descriptor.referenced_models(), vec!["Address", "Person"]);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let descriptor = TypeDescriptor::set(TypeDescriptor::int());
        let json = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(json, "\"Set[int]\"");
        let back: TypeDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, descriptor);
    }
}
