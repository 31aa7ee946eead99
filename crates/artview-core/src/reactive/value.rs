#![forbid(unsafe_code)]

//! Dynamically typed payload for shared cells.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use super::Observable;

/// The cell type every shared-state host exposes.
pub type SharedCell = Observable<Value>;

/// A value held by a [`SharedCell`].
///
/// Small scalars get their own variants so panels can exchange field names,
/// tilt indices, and colour limits without downcasting. Anything produced by
/// an external collaborator (an open radar volume, a grid) travels as
/// [`Value::Opaque`]; the cell never looks inside it.
#[derive(Clone, Default)]
pub enum Value {
    /// Nothing selected yet.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Inclusive `(min, max)` pair, e.g. display limits.
    Range(f64, f64),
    Opaque(Rc<dyn Any>),
}

impl Value {
    /// Wrap an arbitrary payload.
    #[must_use]
    pub fn opaque<T: Any>(value: T) -> Self {
        Self::Opaque(Rc::new(value))
    }

    /// Wrap an already shared payload.
    #[must_use]
    pub fn opaque_rc<T: Any>(value: Rc<T>) -> Self {
        Self::Opaque(value)
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Range(lo, hi) => Some((*lo, *hi)),
            _ => None,
        }
    }

    /// Typed access to an opaque payload.
    ///
    /// Returns `None` for non-opaque values and for payloads of another type.
    #[must_use]
    pub fn downcast_opaque<T: Any>(&self) -> Option<Rc<T>> {
        match self {
            Self::Opaque(any) => Rc::clone(any).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Short name of the variant, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Range(..) => "range",
            Self::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Range(lo, hi) => f.debug_tuple("Range").field(lo).field(hi).finish(),
            Self::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<(f64, f64)> for Value {
    fn from((lo, hi): (f64, f64)) -> Self {
        Self::Range(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Volume {
        sweeps: usize,
    }

    #[test]
    fn scalar_accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(3i64).as_int(), Some(3));
        assert_eq!(Value::from(3i64).as_float(), Some(3.0));
        assert_eq!(Value::from("reflectivity").as_text(), Some("reflectivity"));
        assert_eq!(Value::from((-10.0, 65.0)).as_range(), Some((-10.0, 65.0)));
        assert!(Value::default().is_none());
        assert_eq!(Value::from(1.5).as_int(), None);
    }

    #[test]
    fn opaque_downcast() {
        let value = Value::opaque(Volume { sweeps: 9 });
        let volume = value.downcast_opaque::<Volume>().expect("volume payload");
        assert_eq!(volume.sweeps, 9);
        assert!(value.downcast_opaque::<String>().is_none());
        assert!(Value::Int(1).downcast_opaque::<Volume>().is_none());
    }

    #[test]
    fn opaque_clone_shares_payload() {
        let value = Value::opaque(Volume { sweeps: 1 });
        let copy = value.clone();
        let a = value.downcast_opaque::<Volume>().expect("payload");
        let b = copy.downcast_opaque::<Volume>().expect("payload");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn debug_hides_opaque_payload() {
        assert_eq!(format!("{:?}", Value::opaque(5u8)), "Opaque(..)");
        assert_eq!(format!("{:?}", Value::Int(4)), "Int(4)");
        assert_eq!(Value::Range(0.0, 1.0).kind(), "range");
    }
}
