//! Dynamic values inspected by the structural matchers.
//!
//! Arrays and objects are shared, interior-mutable nodes so that a value can
//! reference itself and so that two handles can be told apart by identity
//! (`x, x` versus two equal-but-distinct copies). Cloning a [`Value`] clones
//! the handle, not the content; use [`Value::deep_clone`] for a fresh tree.
//!
//! Cyclic values keep their nodes alive until the cycle is broken.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Serialize, Serializer};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Shared array node
#[derive(Clone)]
pub struct ArrayRef(Rc<RefCell<Vec<Value>>>);

/// Shared object node; keys iterate in sorted order
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<BTreeMap<String, Value>>>);

impl ArrayRef {
    pub(crate) fn items(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }
}

impl ObjectRef {
    pub(crate) fn fields(&self) -> Ref<'_, BTreeMap<String, Value>> {
        self.0.borrow()
    }
}

/// Opaque callable, compared by identity only
#[derive(Clone)]
pub struct FunctionRef(Rc<str>);

impl FunctionRef {
    /// Function name used in messages
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A dynamically typed value
#[derive(Clone, Default)]
pub enum Value {
    /// Missing value
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number (always f64)
    Number(f64),
    /// Text
    String(String),
    /// Date instant with its offset
    Date(DateTime<FixedOffset>),
    /// Callable; cannot be serialized
    Function(FunctionRef),
    /// Ordered list
    Array(ArrayRef),
    /// String-keyed record
    Object(ObjectRef),
}

/// Runtime kind of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// boolean
    Boolean,
    /// number
    Number,
    /// string
    String,
    /// date
    Date,
    /// function
    Function,
    /// array
    Array,
    /// object
    Object,
}

impl ValueKind {
    /// Lowercase name used in messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Date => "date",
            Self::Function => "function",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Scalar kinds that can be ordered against their own kind
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Boolean | Self::Number | Self::String | Self::Date)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Empty object
    #[must_use]
    pub fn object() -> Self {
        Self::Object(ObjectRef(Rc::new(RefCell::new(BTreeMap::new()))))
    }

    /// Object from key/value pairs
    pub fn object_from<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::Object(ObjectRef(Rc::new(RefCell::new(map))))
    }

    /// Array from items
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let items = items.into_iter().map(Into::into).collect();
        Self::Array(ArrayRef(Rc::new(RefCell::new(items))))
    }

    /// Named function value
    #[must_use]
    pub fn function(name: &str) -> Self {
        Self::Function(FunctionRef(Rc::from(name)))
    }

    /// Set a key on an object; returns false for non-objects
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self {
            Self::Object(node) => {
                node.0.borrow_mut().insert(key.into(), value.into());
                true
            }
            _ => false,
        }
    }

    /// Append to an array; returns false for non-arrays
    pub fn push(&self, value: impl Into<Value>) -> bool {
        match self {
            Self::Array(node) => {
                node.0.borrow_mut().push(value.into());
                true
            }
            _ => false,
        }
    }

    /// Property lookup on an object
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Self::Object(node) => node.0.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Whether an object has the key
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        match self {
            Self::Object(node) => node.0.borrow().contains_key(key),
            _ => false,
        }
    }

    /// Object keys in sorted order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        match self {
            Self::Object(node) => node.0.borrow().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Object entries in sorted key order
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        match self {
            Self::Object(node) => node
                .0
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Array items (handles, not copies)
    #[must_use]
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Self::Array(node) => Some(node.0.borrow().clone()),
            _ => None,
        }
    }

    /// Length of an array, object or string
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Array(node) => node.0.borrow().len(),
            Self::Object(node) => node.0.borrow().len(),
            Self::String(s) => s.chars().count(),
            _ => 0,
        }
    }

    /// Whether [`Value::len`] is zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runtime kind
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined => ValueKind::Undefined,
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Date(_) => ValueKind::Date,
            Self::Function(_) => ValueKind::Function,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// `null` or `undefined`
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Array or object
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Numeric payload
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String payload
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Date payload
    #[must_use]
    pub const fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Identity of a shared node; `None` for scalars
    #[must_use]
    pub fn ptr_id(&self) -> Option<usize> {
        match self {
            Self::Array(node) => Some(Rc::as_ptr(&node.0) as *const () as usize),
            Self::Object(node) => Some(Rc::as_ptr(&node.0) as *const () as usize),
            Self::Function(func) => Some(Rc::as_ptr(&func.0) as *const u8 as usize),
            _ => None,
        }
    }

    /// Whether both handles point at the same node
    #[must_use]
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self.ptr_id(), other.ptr_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Copy the whole tree into fresh nodes, preserving internal cycles
    #[must_use]
    pub fn deep_clone(&self) -> Value {
        let mut copies = HashMap::new();
        self.deep_clone_with(&mut copies)
    }

    fn deep_clone_with(&self, copies: &mut HashMap<usize, Value>) -> Value {
        let Some(id) = self.ptr_id() else {
            return self.clone();
        };
        if let Some(copy) = copies.get(&id) {
            return copy.clone();
        }
        match self {
            Self::Array(node) => {
                let copy = Value::array(Vec::<Value>::new());
                copies.insert(id, copy.clone());
                let items = node.0.borrow().clone();
                for item in items {
                    copy.push(item.deep_clone_with(copies));
                }
                copy
            }
            Self::Object(node) => {
                let copy = Value::object();
                copies.insert(id, copy.clone());
                let entries: Vec<(String, Value)> = node
                    .0
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                for (key, item) in entries {
                    copy.set(key, item.deep_clone_with(copies));
                }
                copy
            }
            // Functions keep their identity
            _ => self.clone(),
        }
    }

    /// JSON view; cycles become `"[Circular]"`, functions and undefined become strings/null
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut path = HashSet::new();
        self.to_json_with(&mut path)
    }

    fn to_json_with(&self, path: &mut HashSet<usize>) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Undefined | Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Self::String(s) => Json::String(s.clone()),
            Self::Date(d) => Json::String(d.to_rfc3339()),
            Self::Function(func) => Json::String(format!("[Function {}]", func.name())),
            Self::Array(_) | Self::Object(_) => {
                let id = self.ptr_id().unwrap_or_default();
                if !path.insert(id) {
                    return Json::String("[Circular]".to_string());
                }
                let json = match self {
                    Self::Array(node) => Json::Array(
                        node.0
                            .borrow()
                            .iter()
                            .map(|item| item.to_json_with(path))
                            .collect(),
                    ),
                    Self::Object(node) => Json::Object(
                        node.0
                            .borrow()
                            .iter()
                            .map(|(k, v)| (k.clone(), v.to_json_with(path)))
                            .collect(),
                    ),
                    _ => Json::Null,
                };
                path.remove(&id);
                json
            }
        }
    }

    fn render(&self, out: &mut String, path: &mut HashSet<usize>) {
        match self {
            Self::Undefined => out.push_str("undefined"),
            Self::Null => out.push_str("null"),
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Number(n) => out.push_str(&format_number(*n)),
            Self::String(s) => out.push_str(&quote(s)),
            Self::Date(d) => out.push_str(&d.to_rfc3339()),
            Self::Function(func) => {
                out.push_str("[Function ");
                out.push_str(func.name());
                out.push(']');
            }
            Self::Array(node) => {
                let id = self.ptr_id().unwrap_or_default();
                if !path.insert(id) {
                    out.push_str("[Circular]");
                    return;
                }
                out.push('[');
                for (i, item) in node.0.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render(out, path);
                }
                out.push(']');
                path.remove(&id);
            }
            Self::Object(node) => {
                let id = self.ptr_id().unwrap_or_default();
                if !path.insert(id) {
                    out.push_str("[Circular]");
                    return;
                }
                out.push('{');
                for (i, (key, item)) in node.0.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(key);
                    out.push_str(": ");
                    item.render(out, path);
                }
                out.push('}');
                path.remove(&id);
            }
        }
    }
}

/// Integral values print without a fraction; non-finite values use JS names
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub(crate) fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, &mut HashSet::new());
        f.write_str(&out)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Value::Array(self.clone()), f)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Value::Object(self.clone()), f)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function {}]", self.name())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::canonical::deep_equal(self, other)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
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

impl From<DateTime<FixedOffset>> for Value {
    fn from(d: DateTime<FixedOffset>) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d.fixed_offset())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::array(items),
            Json::Object(map) => Self::object_from(map),
        }
    }
}

/// Convert each JSON array item into a [`Value`]; non-arrays become one item
pub fn values_from_json(json: serde_json::Value) -> Vec<Value> {
    match json {
        serde_json::Value::Array(items) => items.into_iter().map(Value::from).collect(),
        other => vec![Value::from(other)],
    }
}
