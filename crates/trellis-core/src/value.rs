use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::dep::Dep;
use crate::error::Result;
use crate::observer::ReactiveProp;
use crate::reactive::Tracker;

/// A scope value.
///
/// `Undefined` is what reading an absent member yields; it displays as
/// `undefined` and is loosely (not strictly) equal to `Null`.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Object(Object),
    Method(Method),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Method(_) => "function",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Object(_) | Value::Method(_) => true,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Undefined => f64::NAN,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Object(_) | Value::Method(_) => f64::NAN,
        }
    }

    /// Identity for objects and methods, value equality otherwise.
    /// `NaN` is never equal to itself.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Method(a), Value::Method(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// `strict_eq` with number/string/bool coercion between primitives.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
            (Value::Number(_), Value::Str(_))
            | (Value::Str(_), Value::Number(_))
            | (Value::Bool(_), Value::Number(_) | Value::Str(_))
            | (Value::Number(_) | Value::Str(_), Value::Bool(_)) => {
                self.to_number() == other.to_number()
            }
            _ => self.strict_eq(other),
        }
    }
}

fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        f.write_str("0")
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form carries an explicit sign: 1e+21, 1.5e-7.
        let exp = format!("{n:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                write!(f, "{mantissa}e+{power}")
            }
            _ => f.write_str(&exp),
        }
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => format_number(*n, f),
            Value::Str(s) => f.write_str(s),
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Method(_) => f.write_str("function"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Undefined => f.write_str("Undefined"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Object(o) => o.fmt(f),
            Value::Method(m) => m.fmt(f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Method> for Value {
    fn from(m: Method) -> Self {
        Value::Method(m)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            // Arrays get no special treatment: they become index-keyed objects.
            serde_json::Value::Array(items) => Value::Object(
                items
                    .into_iter()
                    .enumerate()
                    .fold(Object::new(), |o, (i, v)| o.with(i.to_string(), v)),
            ),
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .fold(Object::new(), |o, (k, v)| o.with(k, v)),
            ),
        }
    }
}

pub type MethodFn = dyn Fn(&Object, &[Value]) -> Result<Value>;

/// A callable scope property. Invoked with the object it was read from as
/// `this`.
#[derive(Clone)]
pub struct Method(Rc<MethodFn>);

impl Method {
    pub fn new(f: impl Fn(&Object, &[Value]) -> Result<Value> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, this: &Object, args: &[Value]) -> Result<Value> {
        (self.0)(this, args)
    }

    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method(<fn>)")
    }
}

/// Shared, insertion-ordered property map.
///
/// A property starts out plain; [`observe`](crate::observe) swaps it for a
/// reactive one whose reads and writes go through its [`Dep`].
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<Vec<Entry>>>);

struct Entry {
    key: Rc<str>,
    slot: Slot,
}

#[derive(Clone)]
pub(crate) enum Slot {
    Plain(Value),
    Reactive(Rc<ReactiveProp>),
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for constructing raw data.
    pub fn with(self, key: impl Into<Rc<str>>, value: impl Into<Value>) -> Self {
        self.insert_plain(key.into(), value.into());
        self
    }

    fn insert_plain(&self, key: Rc<str>, value: Value) {
        let mut entries = self.0.borrow_mut();
        match entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.slot = Slot::Plain(value),
            None => entries.push(Entry {
                key,
                slot: Slot::Plain(value),
            }),
        }
    }

    fn slot(&self, key: &str) -> Option<Slot> {
        self.0
            .borrow()
            .iter()
            .find(|e| &*e.key == key)
            .map(|e| e.slot.clone())
    }

    /// Reads `key`. Reactive properties subscribe the watcher evaluating
    /// under the tracker they were installed with.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.slot(key)? {
            Slot::Plain(v) => Some(v),
            Slot::Reactive(prop) => Some(prop.get()),
        }
    }

    /// [`Object::get`], additionally subscribing whoever evaluates under
    /// `tracker`. Used when the object is shared with another scope.
    pub fn get_in(&self, key: &str, tracker: &Tracker) -> Option<Value> {
        match self.slot(key)? {
            Slot::Plain(v) => Some(v),
            Slot::Reactive(prop) => Some(prop.get_in(tracker)),
        }
    }

    /// Writes `key`, notifying subscribers when the property is reactive
    /// and the value actually changed. Unknown keys are appended as plain
    /// properties and are not observed.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match self.slot(key) {
            Some(Slot::Reactive(prop)) => prop.set(value),
            Some(Slot::Plain(_)) => {
                self.insert_plain(Rc::from(key), value);
                Ok(())
            }
            None => {
                log::warn!("writing new property `{key}`; it will not be reactive");
                self.insert_plain(Rc::from(key), value);
                Ok(())
            }
        }
    }

    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0.borrow().iter().map(|e| e.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().iter().any(|e| &*e.key == key)
    }

    pub fn is_reactive(&self, key: &str) -> bool {
        matches!(self.slot(key), Some(Slot::Reactive(_)))
    }

    /// Registry backing `key`, once it has been made reactive.
    pub fn dep(&self, key: &str) -> Option<Rc<Dep>> {
        match self.slot(key)? {
            Slot::Reactive(prop) => Some(prop.dep().clone()),
            Slot::Plain(_) => None,
        }
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Swaps a plain slot for `make(value)` and hands the original value
    /// back. Reactive slots are left alone.
    pub(crate) fn make_reactive(
        &self,
        key: &str,
        make: impl FnOnce(Rc<str>, Value) -> Rc<ReactiveProp>,
    ) -> Option<Value> {
        let mut entries = self.0.borrow_mut();
        let entry = entries.iter_mut().find(|e| &*e.key == key)?;
        let Slot::Plain(value) = &entry.slot else {
            return None;
        };
        let value = value.clone();
        entry.slot = Slot::Reactive(make(entry.key.clone(), value.clone()));
        Some(value)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: objects may be cyclic.
        f.debug_struct("Object").field("keys", &self.keys()).finish()
    }
}
