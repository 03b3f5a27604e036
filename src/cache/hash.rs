//! Key hashing
//!
//! Turns structured values into short, stable fingerprints for cache keys.
//! Values are first written in a canonical text form (object keys sorted,
//! back-references and anything nested deeper than [`MAX_CANONICAL_DEPTH`]
//! replaced by markers) and the result is digested with SHA-256.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Written in place of a container that is already being serialized.
const CYCLE_MARKER: &str = "#cycle";

/// Written in place of a container nested past [`MAX_CANONICAL_DEPTH`].
const DEPTH_MARKER: &str = "#depth";

/// Deepest container nesting written out in full. Matches the recursion
/// limit serde_json applies when parsing, so anything parsed from JSON text
/// is hashed completely.
pub const MAX_CANONICAL_DEPTH: usize = 128;

/// Canonical form used when a serde value cannot be serialized.
const UNSERIALIZABLE_MARKER: &str = "#unserializable";

/// Number of digest bytes kept in a fingerprint (16 hex characters).
const FINGERPRINT_BYTES: usize = 8;

// == Canonical Form ==
/// Values that can be written in canonical form for fingerprinting.
pub trait CanonicalForm {
    fn write_canonical(&self, out: &mut CanonicalWriter);
}

/// Accumulates the canonical text of a value.
#[derive(Debug, Default)]
pub struct CanonicalWriter {
    buf: String,
    /// Addresses of the containers currently being written
    path: Vec<usize>,
    /// Containers currently open
    depth: usize,
    cycles: usize,
    truncated: usize,
}

impl CanonicalWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn null(&mut self) {
        self.buf.push_str("null");
    }

    pub fn bool(&mut self, value: bool) {
        self.buf.push_str(if value { "true" } else { "false" });
    }

    /// Writes an already formatted number.
    pub fn number(&mut self, value: impl std::fmt::Display) {
        self.buf.push_str(&value.to_string());
    }

    pub fn string(&mut self, value: &str) {
        self.buf
            .push_str(&serde_json::to_string(value).unwrap_or_default());
    }

    /// Writes items in order.
    pub fn sequence<'a, T, I>(&mut self, items: I)
    where
        T: CanonicalForm + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        if !self.enter() {
            return;
        }
        self.buf.push('[');
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            item.write_canonical(self);
        }
        self.buf.push(']');
        self.depth -= 1;
    }

    /// Writes entries sorted by key, whatever order they arrive in.
    pub fn map<'a, T, I>(&mut self, entries: I)
    where
        T: CanonicalForm + ?Sized + 'a,
        I: IntoIterator<Item = (&'a str, &'a T)>,
    {
        if !self.enter() {
            return;
        }
        let mut entries: Vec<(&str, &T)> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        self.buf.push('{');
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.string(key);
            self.buf.push(':');
            value.write_canonical(self);
        }
        self.buf.push('}');
        self.depth -= 1;
    }

    /// Opens a container, or writes the depth marker once too deep.
    fn enter(&mut self) -> bool {
        if self.depth >= MAX_CANONICAL_DEPTH {
            self.truncated += 1;
            self.buf.push_str(DEPTH_MARKER);
            return false;
        }
        self.depth += 1;
        true
    }

    /// Writes a shared container, substituting the cycle marker when the
    /// container is already on the current path.
    pub fn shared<F>(&mut self, address: usize, write: F)
    where
        F: FnOnce(&mut Self),
    {
        if self.path.contains(&address) {
            self.cycles += 1;
            self.buf.push_str(CYCLE_MARKER);
            return;
        }
        self.path.push(address);
        write(self);
        self.path.pop();
    }

    /// Number of back-references replaced so far.
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Number of containers replaced by the depth marker so far.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

// == Key Hasher ==
/// Deterministic fingerprinting for cache keys.
pub struct KeyHasher;

impl KeyHasher {
    /// Fingerprints a value. Never fails, never mutates the input.
    pub fn hash<T: CanonicalForm + ?Sized>(value: &T) -> String {
        Self::digest(&Self::canonical(value))
    }

    /// Fingerprints any serde value through its JSON data model.
    ///
    /// Serialization failures (for example maps with non-string keys) fall
    /// back to a fixed marker. Types containing shared references should be
    /// modelled as [`GraphValue`] instead.
    pub fn hash_serializable<T: Serialize + ?Sized>(value: &T) -> String {
        match serde_json::to_value(value) {
            Ok(json) => Self::hash(&json),
            Err(err) => {
                warn!(error = %err, "Value not serializable, hashing fallback marker");
                Self::digest(UNSERIALIZABLE_MARKER)
            }
        }
    }

    /// Canonical text that [`KeyHasher::hash`] digests.
    pub fn canonical<T: CanonicalForm + ?Sized>(value: &T) -> String {
        let mut writer = CanonicalWriter::new();
        value.write_canonical(&mut writer);
        if writer.cycles() > 0 {
            debug!(cycles = writer.cycles(), "Replaced cyclic references while hashing");
        }
        if writer.truncated() > 0 {
            warn!(
                max_depth = MAX_CANONICAL_DEPTH,
                "Truncated deeply nested value while hashing"
            );
        }
        writer.into_string()
    }

    fn digest(canonical: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }
}

// == Graph Values ==
/// Shared list node.
pub type SharedList = Rc<RefCell<Vec<GraphValue>>>;
/// Shared object node.
pub type SharedMap = Rc<RefCell<BTreeMap<String, GraphValue>>>;

/// A JSON-like value whose containers are shared references, so it can
/// express self-referential shapes.
///
/// ```
/// use render_cache::cache::{GraphValue, KeyHasher};
///
/// let node = GraphValue::map();
/// node.insert("self", node.clone());
/// assert!(!KeyHasher::hash(&node).is_empty());
/// ```
#[derive(Debug, Clone)]
pub enum GraphValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(SharedList),
    Map(SharedMap),
}

impl GraphValue {
    /// Empty shared list.
    pub fn list() -> Self {
        GraphValue::List(Rc::new(RefCell::new(Vec::new())))
    }

    /// Empty shared object.
    pub fn map() -> Self {
        GraphValue::Map(Rc::new(RefCell::new(BTreeMap::new())))
    }

    /// Appends to a list. Returns false when `self` is not a list.
    pub fn push(&self, value: GraphValue) -> bool {
        match self {
            GraphValue::List(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Sets an object field. Returns false when `self` is not an object.
    pub fn insert(&self, key: impl Into<String>, value: GraphValue) -> bool {
        match self {
            GraphValue::Map(fields) => {
                fields.borrow_mut().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }
}

impl From<serde_json::Value> for GraphValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => GraphValue::Null,
            serde_json::Value::Bool(b) => GraphValue::Bool(b),
            serde_json::Value::Number(n) => GraphValue::Number(n),
            serde_json::Value::String(s) => GraphValue::String(s),
            serde_json::Value::Array(items) => GraphValue::List(Rc::new(RefCell::new(
                items.into_iter().map(GraphValue::from).collect(),
            ))),
            serde_json::Value::Object(fields) => GraphValue::Map(Rc::new(RefCell::new(
                fields.into_iter().map(|(k, v)| (k, GraphValue::from(v))).collect(),
            ))),
        }
    }
}

// == CanonicalForm Implementations ==
impl CanonicalForm for GraphValue {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        match self {
            GraphValue::Null => out.null(),
            GraphValue::Bool(b) => out.bool(*b),
            GraphValue::Number(n) => out.number(n),
            GraphValue::String(s) => out.string(s),
            GraphValue::List(items) => {
                out.shared(Rc::as_ptr(items) as usize, |out| {
                    out.sequence(items.borrow().iter());
                });
            }
            GraphValue::Map(fields) => {
                out.shared(Rc::as_ptr(fields) as usize, |out| {
                    out.map(fields.borrow().iter().map(|(k, v)| (k.as_str(), v)));
                });
            }
        }
    }
}

impl CanonicalForm for serde_json::Value {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        match self {
            serde_json::Value::Null => out.null(),
            serde_json::Value::Bool(b) => out.bool(*b),
            serde_json::Value::Number(n) => out.number(n),
            serde_json::Value::String(s) => out.string(s),
            serde_json::Value::Array(items) => out.sequence(items.iter()),
            serde_json::Value::Object(fields) => {
                out.map(fields.iter().map(|(k, v)| (k.as_str(), v)));
            }
        }
    }
}

impl CanonicalForm for str {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.string(self);
    }
}

impl CanonicalForm for String {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.string(self);
    }
}

impl CanonicalForm for bool {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.bool(*self);
    }
}

impl CanonicalForm for i64 {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.number(self);
    }
}

impl CanonicalForm for u64 {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.number(self);
    }
}

impl<T: CanonicalForm> CanonicalForm for Option<T> {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        match self {
            Some(value) => value.write_canonical(out),
            None => out.null(),
        }
    }
}

impl<T: CanonicalForm> CanonicalForm for [T] {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.sequence(self.iter());
    }
}

impl<T: CanonicalForm> CanonicalForm for Vec<T> {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.sequence(self.iter());
    }
}

impl<T: CanonicalForm> CanonicalForm for BTreeMap<String, T> {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.map(self.iter().map(|(k, v)| (k.as_str(), v)));
    }
}

impl<T: CanonicalForm, S> CanonicalForm for HashMap<String, T, S> {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        out.map(self.iter().map(|(k, v)| (k.as_str(), v)));
    }
}

impl<T: CanonicalForm + ?Sized> CanonicalForm for &T {
    fn write_canonical(&self, out: &mut CanonicalWriter) {
        (**self).write_canonical(out);
    }
}
