//! Typed variable store with copy-on-write snapshots.
//!
//! The store owns the current value of every declared variable. Cloning is
//! O(1): declarations are shared behind an `Arc` and values live in a
//! persistent map, so an evaluation pass can work on a private copy while
//! the host keeps the original.

use std::collections::BTreeMap;
use std::sync::Arc;

use formlogic_foundation::{Error, Result, SharedMap, Value};
use tracing::trace;

use crate::form::FormDefinition;
use crate::variable::VariableDefinition;

// =============================================================================
// Variable Store
// =============================================================================

/// Typed key/value container for a submission's variables.
#[derive(Clone, Debug)]
pub struct VariableStore {
    /// Declarations in declaration order
    definitions: Arc<[VariableDefinition]>,
    /// Key -> position in `definitions`
    index: Arc<BTreeMap<String, usize>>,
    /// Current values, one per declaration
    values: SharedMap<Arc<str>, Value>,
}

impl VariableStore {
    /// Creates a store holding the default value of every declaration.
    ///
    /// # Errors
    /// Returns an error if two declarations share a key.
    pub fn new(definitions: impl IntoIterator<Item = VariableDefinition>) -> Result<Self> {
        let definitions: Vec<VariableDefinition> = definitions.into_iter().collect();
        let mut index = BTreeMap::new();
        let mut values = SharedMap::new();

        for (position, def) in definitions.iter().enumerate() {
            if index.insert(def.key.clone(), position).is_some() {
                return Err(Error::duplicate_variable(def.key.clone()));
            }
            values.insert_mut(Arc::from(def.key.as_str()), def.default_value());
        }

        Ok(Self {
            definitions: definitions.into(),
            index: Arc::new(index),
            values,
        })
    }

    /// Creates a store for every variable of a form.
    ///
    /// # Errors
    /// Returns an error if the form declares a key twice.
    pub fn for_form(form: &FormDefinition) -> Result<Self> {
        Self::new(form.variable_definitions())
    }

    /// Returns the number of declared variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if no variables are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns true if `key` is declared.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the declaration of `key`.
    #[must_use]
    pub fn definition(&self, key: &str) -> Option<&VariableDefinition> {
        self.index.get(key).map(|&i| &self.definitions[i])
    }

    /// Returns all declarations in declaration order.
    #[must_use]
    pub fn definitions(&self) -> &[VariableDefinition] {
        &self.definitions
    }

    /// Gets the current value of `key`.
    ///
    /// # Errors
    /// Returns `UnknownVariable` if `key` is not declared.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.lookup(key).ok_or_else(|| Error::unknown_variable(key))
    }

    /// Gets the current value of `key`, or `None` if it is not declared.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Writes a value, coercing it to the declared type.
    ///
    /// Returns whether the stored value changed. On error the previous value
    /// is kept.
    ///
    /// # Errors
    /// Returns `UnknownVariable` or `TypeMismatch`.
    pub fn set(&mut self, key: &str, value: Value) -> Result<bool> {
        let coerced = self.coerce(key, value)?;
        Ok(self.write(key, coerced))
    }

    /// Resets `key` to its declared default.
    ///
    /// # Errors
    /// Returns `UnknownVariable` if `key` is not declared.
    pub fn reset(&mut self, key: &str) -> Result<bool> {
        let default = self
            .definition(key)
            .map(VariableDefinition::default_value)
            .ok_or_else(|| Error::unknown_variable(key))?;
        Ok(self.write(key, default))
    }

    /// Applies a set of writes atomically: either every write succeeds or the
    /// store is left untouched.
    ///
    /// # Errors
    /// Returns the first `UnknownVariable` or `TypeMismatch` found.
    pub fn merge<K, I>(&mut self, overlay: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let staged = overlay
            .into_iter()
            .map(|(key, value)| {
                let key = key.as_ref();
                self.coerce(key, value).map(|v| (key.to_string(), v))
            })
            .collect::<Result<Vec<_>>>()?;

        for (key, value) in staged {
            self.write(&key, value);
        }
        Ok(())
    }

    /// Seeds the store from host data, keeping going past bad entries.
    ///
    /// Returns one error per rejected entry; rejected keys keep their
    /// previous value.
    pub fn seed<'a, I>(&mut self, data: I) -> Vec<Error>
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        data.into_iter()
            .filter_map(|(key, value)| self.set(key, value.clone()).err())
            .collect()
    }

    /// Takes an immutable copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> VariableSnapshot {
        VariableSnapshot(self.clone())
    }

    /// Iterates `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.definitions.iter().filter_map(|def| {
            self.values
                .get(def.key.as_str())
                .map(|value| (def.key.as_str(), value))
        })
    }

    /// Values that differ from `base`, in key order.
    #[must_use]
    pub fn changes_since(&self, base: &VariableSnapshot) -> BTreeMap<String, Value> {
        self.iter()
            .filter(|(key, value)| base.lookup(key) != Some(*value))
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    fn coerce(&self, key: &str, value: Value) -> Result<Value> {
        let def = self
            .definition(key)
            .ok_or_else(|| Error::unknown_variable(key))?;
        let actual = value.type_name();
        def.data_type
            .coerce(value)
            .ok_or_else(|| Error::type_mismatch(key, def.data_type, actual))
    }

    fn write(&mut self, key: &str, value: Value) -> bool {
        if self.values.get(key) == Some(&value) {
            return false;
        }
        trace!(key, value = %value, "variable written");
        self.values.insert_mut(Arc::from(key), value);
        true
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable copy of a [`VariableStore`].
///
/// Taking a snapshot is O(1). Later writes to the originating store are not
/// visible through the snapshot.
#[derive(Clone, Debug)]
pub struct VariableSnapshot(VariableStore);

impl VariableSnapshot {
    /// Gets the value of `key`.
    ///
    /// # Errors
    /// Returns `UnknownVariable` if `key` is not declared.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.0.get(key)
    }

    /// Gets the value of `key`, or `None` if it is not declared.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.0.lookup(key)
    }

    /// Returns the declaration of `key`.
    #[must_use]
    pub fn definition(&self, key: &str) -> Option<&VariableDefinition> {
        self.0.definition(key)
    }

    /// Iterates `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter()
    }

    /// Starts a private, writable copy of this snapshot.
    #[must_use]
    pub fn to_store(&self) -> VariableStore {
        self.0.clone()
    }
}
