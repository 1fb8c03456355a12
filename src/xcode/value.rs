//! Value model for OpenStep-style property lists.
use indexmap::IndexMap;

/// Ordered dictionary; insertion order is preserved on write.
pub type Dict = IndexMap<String, Value>;

/// A node of an OpenStep property list: string, array or dictionary.
///
/// Numbers are kept as strings, exactly as the manifest stores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Quoted or unquoted scalar.
    String(String),
    /// `( a, b, )`
    Array(Vec<Self>),
    /// `{ key = value; }`
    Dict(Dict),
}

impl Value {
    /// Borrow the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Mutably borrow the elements, if this is an array.
    pub const fn as_array_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the entries, if this is a dictionary.
    #[must_use]
    pub const fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Mutably borrow the entries, if this is a dictionary.
    pub const fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Array(items)
    }
}

/// Read a string-valued key from a dictionary.
#[must_use]
pub fn get_str<'a>(dict: &'a Dict, key: &str) -> Option<&'a str> {
    dict.get(key).and_then(Value::as_str)
}

/// Collect the string elements of an array-valued key; non-strings are ignored.
#[must_use]
pub fn get_str_array(dict: &Dict, key: &str) -> Vec<String> {
    dict.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Mutable access to an array-valued key, creating an empty array when the
/// key is absent or holds a non-array.
#[allow(clippy::unreachable)]
pub fn array_entry<'a>(dict: &'a mut Dict, key: &str) -> &'a mut Vec<Value> {
    let slot = dict
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !matches!(slot, Value::Array(_)) {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        Value::String(_) | Value::Dict(_) => unreachable!("slot normalised to an array"),
    }
}
