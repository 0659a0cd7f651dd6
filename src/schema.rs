//! Schema-driven mapping between a document and a typed record.
//!
//! A [`Schema`] is an explicit registry: each entry names a `(section, key)`
//! pair and carries a pair of codec closures that move a value between the
//! record and its textual form. Fields are registered once per target type
//! and the same schema drives both [`Ini::decode`] and [`Ini::encode`].
//!
//! ```
//! use initext::{Ini, Schema};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let schema = Schema::new()
//!     .field("server", "host", |s: &Server| &s.host, |s: &mut Server| &mut s.host)
//!     .field("server", "port", |s: &Server| &s.port, |s: &mut Server| &mut s.port);
//!
//! let mut ini = Ini::new();
//! ini.read_from("[server]\nhost = example.org\nport = 8080\n".as_bytes()).unwrap();
//!
//! let mut server = Server::default();
//! ini.decode(&schema, &mut server).unwrap();
//! assert_eq!(server.host, "example.org");
//! assert_eq!(server.port, 8080);
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::IniError;
use crate::ini::Ini;

/// The separators a document is configured with, handed to list and map
/// codecs at decode/encode time.
pub(crate) struct Separators {
    pub list: char,
    pub map_key: char,
}

type Load<T> = Box<dyn Fn(&mut T, &str, &Separators) -> Result<(), String>>;
type Store<T> = Box<dyn Fn(&T, &Separators) -> Result<String, String>>;

struct Field<T> {
    section: String,
    key: String,
    last_in_block: bool,
    load: Load<T>,
    store: Store<T>,
}

/// A field-by-field mapping from `(section, key)` pairs to the fields of a
/// record type `T`.
///
/// Registration order is the encode order. Fields you do not register are
/// simply left alone on decode and omitted on encode.
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    fn push(mut self, section: &str, key: &str, load: Load<T>, store: Store<T>) -> Self {
        self.fields.push(Field {
            section: section.to_string(),
            key: key.to_string(),
            last_in_block: false,
            load,
            store,
        });
        self
    }

    /// Register a scalar field. Any `V` with a textual codec through
    /// `FromStr`/`Display` works: integers, floats, booleans, strings, or
    /// custom types. An empty `section` targets the global section.
    pub fn field<V, G, M>(self, section: &str, key: &str, get: G, get_mut: M) -> Self
    where
        V: FromStr + Display + 'static,
        V::Err: Display + 'static,
        G: Fn(&T) -> &V + 'static,
        M: Fn(&mut T) -> &mut V + 'static,
    {
        self.push(
            section,
            key,
            Box::new(move |target, raw, _| {
                *get_mut(target) = raw.parse().map_err(|err: V::Err| err.to_string())?;
                Ok(())
            }),
            Box::new(move |source, _| Ok(get(source).to_string())),
        )
    }

    /// Register a field with hand-written codecs, for types without a
    /// usable `FromStr`/`Display` pair. Either side may fail.
    pub fn field_with<L, S>(self, section: &str, key: &str, load: L, store: S) -> Self
    where
        L: Fn(&mut T, &str) -> Result<(), String> + 'static,
        S: Fn(&T) -> Result<String, String> + 'static,
    {
        self.push(
            section,
            key,
            Box::new(move |target, raw, _| load(target, raw)),
            Box::new(move |source, _| store(source)),
        )
    }

    /// Register a `Vec` field, split and joined on the document's list
    /// separator. An empty value decodes to an empty vec.
    pub fn list<V, G, M>(self, section: &str, key: &str, get: G, get_mut: M) -> Self
    where
        V: FromStr + Display + 'static,
        V::Err: Display + 'static,
        G: Fn(&T) -> &Vec<V> + 'static,
        M: Fn(&mut T) -> &mut Vec<V> + 'static,
    {
        self.push(
            section,
            key,
            Box::new(move |target, raw, seps| {
                let items = get_mut(target);
                items.clear();
                if raw.is_empty() {
                    return Ok(());
                }
                for (idx, part) in raw.split(seps.list).enumerate() {
                    let item = part
                        .parse()
                        .map_err(|err: V::Err| format!("{err} at index {idx}"))?;
                    items.push(item);
                }
                Ok(())
            }),
            Box::new(move |source, seps| {
                let mut out = String::new();
                for (idx, item) in get(source).iter().enumerate() {
                    if idx > 0 {
                        out.push(seps.list);
                    }
                    out.push_str(&item.to_string());
                }
                Ok(out)
            }),
        )
    }

    /// Register a map field. Entries serialize as `key<mapsep>value`,
    /// joined on the list separator; `BTreeMap` keeps the encoding
    /// deterministic.
    pub fn map<K, V, G, M>(self, section: &str, key: &str, get: G, get_mut: M) -> Self
    where
        K: FromStr + Display + Ord + 'static,
        K::Err: Display + 'static,
        V: FromStr + Display + 'static,
        V::Err: Display + 'static,
        G: Fn(&T) -> &BTreeMap<K, V> + 'static,
        M: Fn(&mut T) -> &mut BTreeMap<K, V> + 'static,
    {
        self.push(
            section,
            key,
            Box::new(move |target, raw, seps| {
                let entries = get_mut(target);
                entries.clear();
                if raw.is_empty() {
                    return Ok(());
                }
                for part in raw.split(seps.list) {
                    let (k, v) = part
                        .split_once(seps.map_key)
                        .ok_or_else(|| format!("missing '{}' in map entry", seps.map_key))?;
                    let k = k.parse().map_err(|err: K::Err| err.to_string())?;
                    let v = v.parse().map_err(|err: V::Err| err.to_string())?;
                    entries.insert(k, v);
                }
                Ok(())
            }),
            Box::new(move |source, seps| {
                let mut out = String::new();
                for (idx, (k, v)) in get(source).iter().enumerate() {
                    if idx > 0 {
                        out.push(seps.list);
                    }
                    out.push_str(&k.to_string());
                    out.push(seps.map_key);
                    out.push_str(&v.to_string());
                }
                Ok(out)
            }),
        )
    }

    /// Mark the most recently registered field as the last key of its
    /// block: encoding appends a blank-line separator after it.
    pub fn last_in_block(mut self) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.last_in_block = true;
        }
        self
    }

    /// Flatten a sub-record's schema into this one. Sub-fields registered
    /// without a section default to `section`, so a nested record maps to
    /// a named sub-section of its own.
    pub fn nested<U, G, M>(mut self, section: &str, schema: Schema<U>, get: G, get_mut: M) -> Self
    where
        U: 'static,
        G: Fn(&T) -> &U + 'static,
        M: Fn(&mut T) -> &mut U + 'static,
    {
        let get = Rc::new(get);
        let get_mut = Rc::new(get_mut);
        for field in schema.fields {
            let target_section = if field.section.is_empty() {
                section.to_string()
            } else {
                field.section
            };
            let inner_load = field.load;
            let inner_store = field.store;
            let get_mut = Rc::clone(&get_mut);
            let get = Rc::clone(&get);
            self.fields.push(Field {
                section: target_section,
                key: field.key,
                last_in_block: field.last_in_block,
                load: Box::new(move |target, raw, seps| inner_load((*get_mut)(target), raw, seps)),
                store: Box::new(move |source, seps| inner_store((*get)(source), seps)),
            });
        }
        self
    }
}

impl Ini {
    /// Fill `target` from the document through `schema`.
    ///
    /// Keys absent from the document leave the corresponding field
    /// untouched. The first codec failure aborts, wrapped with the
    /// offending `section.key` path.
    pub fn decode<T>(&self, schema: &Schema<T>, target: &mut T) -> Result<(), IniError> {
        let seps = Separators {
            list: self.list_sep,
            map_key: self.map_key_sep,
        };
        for field in &schema.fields {
            let Some(value) = self.get(&field.section, &field.key) else {
                continue;
            };
            (field.load)(target, value, &seps).map_err(|reason| IniError::Decode {
                section: field.section.clone(),
                key: field.key.clone(),
                reason,
            })?;
        }
        Ok(())
    }

    /// Set every schema field from `source`, in registration order,
    /// appending a block separator after fields marked
    /// [`last_in_block`](Schema::last_in_block).
    pub fn encode<T>(&mut self, schema: &Schema<T>, source: &T) -> Result<(), IniError> {
        let seps = Separators {
            list: self.list_sep,
            map_key: self.map_key_sep,
        };
        for field in &schema.fields {
            let value = (field.store)(source, &seps).map_err(|reason| IniError::Encode {
                section: field.section.clone(),
                key: field.key.clone(),
                reason,
            })?;
            self.set(&field.section, &field.key, &value);
            if field.last_in_block {
                self.set(&field.section, "", "");
            }
        }
        Ok(())
    }
}
