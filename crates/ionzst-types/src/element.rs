use crate::decimal::Decimal;
use crate::int::Int;
use crate::ion_type::IonType;
use crate::symbol::Symbol;
use crate::timestamp::Timestamp;

/// One Ion value with its annotations.
///
/// This is the unit that flows through the render stage: the binary
/// reader produces `Element`s, the text writer consumes them. Order of
/// annotations and struct fields is preserved exactly as decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub annotations: Vec<Symbol>,
    pub value: Value,
}

/// The Ion data model.
///
/// ```text
/// ┌───────────┬──────────────────────────────────────────────┐
/// │ Variant   │ Payload                                      │
/// ├───────────┼──────────────────────────────────────────────┤
/// │ Null      │ the null's type (`null.int` → IonType::Int)  │
/// │ Int       │ arbitrary-size sign + magnitude              │
/// │ Float     │ f64 (binary32 values are widened)            │
/// │ Decimal   │ coefficient × 10^exponent                    │
/// │ Symbol    │ text, or an ID with unknown text             │
/// │ Clob/Blob │ raw bytes                                    │
/// │ Struct    │ ordered (field name, value) pairs; repeated  │
/// │           │ names allowed                                │
/// └───────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null(IonType),
    Bool(bool),
    Int(Int),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Symbol(Symbol),
    String(String),
    Clob(Vec<u8>),
    Blob(Vec<u8>),
    List(Vec<Element>),
    SExp(Vec<Element>),
    Struct(Vec<(Symbol, Element)>),
}

impl Value {
    pub fn ion_type(&self) -> IonType {
        match self {
            Self::Null(ion_type) => *ion_type,
            Self::Bool(_) => IonType::Bool,
            Self::Int(_) => IonType::Int,
            Self::Float(_) => IonType::Float,
            Self::Decimal(_) => IonType::Decimal,
            Self::Timestamp(_) => IonType::Timestamp,
            Self::Symbol(_) => IonType::Symbol,
            Self::String(_) => IonType::String,
            Self::Clob(_) => IonType::Clob,
            Self::Blob(_) => IonType::Blob,
            Self::List(_) => IonType::List,
            Self::SExp(_) => IonType::SExp,
            Self::Struct(_) => IonType::Struct,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }
}

impl Element {
    pub fn new(value: Value) -> Self {
        Self {
            annotations: Vec::new(),
            value,
        }
    }

    pub fn with_annotations<I, S>(mut self, annotations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.annotations = annotations.into_iter().map(Into::into).collect();
        self
    }

    pub fn ion_type(&self) -> IonType {
        self.value.ion_type()
    }

    /// Shorthand for building a struct from `(name, value)` pairs.
    pub fn structure<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Element)>,
        S: Into<Symbol>,
    {
        Self::new(Value::Struct(
            fields.into_iter().map(|(name, value)| (name.into(), value)).collect(),
        ))
    }

    /// Look up the first field named `name` in a struct.
    pub fn field(&self, name: &str) -> Option<&Element> {
        let Value::Struct(fields) = &self.value else {
            return None;
        };
        fields
            .iter()
            .find(|(field, _)| field.text() == Some(name))
            .map(|(_, value)| value)
    }
}

impl From<Value> for Element {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Self::new(Value::Int(Int::from(value)))
    }
}

impl From<bool> for Element {
    fn from(value: bool) -> Self {
        Self::new(Value::Bool(value))
    }
}

impl From<f64> for Element {
    fn from(value: f64) -> Self {
        Self::new(Value::Float(value))
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Self::new(Value::String(value.to_owned()))
    }
}

impl From<Decimal> for Element {
    fn from(value: Decimal) -> Self {
        Self::new(Value::Decimal(value))
    }
}

impl From<Timestamp> for Element {
    fn from(value: Timestamp) -> Self {
        Self::new(Value::Timestamp(value))
    }
}
