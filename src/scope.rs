use crate::error::ScopeError;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Serial numbers are unique across every arena, so a handle from another
/// arena or from a released scope never matches a live record.
static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: Value,
    pub constant: bool,
}

/// Handle to a scope inside [`Scopes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId {
    index: usize,
    serial: u64,
}

#[derive(Debug)]
struct ScopeRecord {
    serial: u64,
    parent: Option<ScopeId>,
    variables: HashMap<String, Variable>,
}

/// Arena of nested scopes. A parent is always older than its children, so
/// the parent chain cannot loop.
#[derive(Debug, Default)]
pub struct Scopes {
    records: Vec<ScopeRecord>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let serial = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);
        self.records.push(ScopeRecord {
            serial,
            parent,
            variables: HashMap::new(),
        });
        ScopeId {
            index: self.records.len() - 1,
            serial,
        }
    }

    pub fn push_root(&mut self) -> ScopeId {
        self.insert(None)
    }

    pub fn push(&mut self, parent: ScopeId) -> Result<ScopeId, ScopeError> {
        self.record(parent)?;
        Ok(self.insert(Some(parent)))
    }

    /// Drops `scope` together with every scope created after it.
    pub fn release(&mut self, scope: ScopeId) -> Result<(), ScopeError> {
        self.record(scope)?;
        self.records.truncate(scope.index);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&self, scope: ScopeId) -> Result<&ScopeRecord, ScopeError> {
        self.records
            .get(scope.index)
            .filter(|record| record.serial == scope.serial)
            .ok_or(ScopeError::InvalidScope)
    }

    fn record_mut(&mut self, scope: ScopeId) -> Result<&mut ScopeRecord, ScopeError> {
        self.records
            .get_mut(scope.index)
            .filter(|record| record.serial == scope.serial)
            .ok_or(ScopeError::InvalidScope)
    }

    pub fn parent(&self, scope: ScopeId) -> Result<Option<ScopeId>, ScopeError> {
        Ok(self.record(scope)?.parent)
    }

    /// Whether `name` is defined in `scope` itself, ignoring ancestors.
    pub fn contains(&self, scope: ScopeId, name: &str) -> Result<bool, ScopeError> {
        Ok(self.record(scope)?.variables.contains_key(name))
    }

    pub fn define(&mut self, scope: ScopeId, name: &str, value: Value, constant: bool) -> Result<(), ScopeError> {
        let record = self.record_mut(scope)?;
        if record.variables.contains_key(name) {
            return Err(ScopeError::AlreadyDefined(name.to_string()));
        }

        record
            .variables
            .insert(name.to_string(), Variable { value, constant });
        Ok(())
    }

    /// Walks from `scope` towards the root and returns the first scope that
    /// defines `name`.
    fn resolve(&self, scope: ScopeId, name: &str) -> Result<ScopeId, ScopeError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let record = self.record(id)?;
            if record.variables.contains_key(name) {
                return Ok(id);
            }
            current = record.parent;
        }
        Err(ScopeError::Undefined(name.to_string()))
    }

    pub fn lookup(&self, scope: ScopeId, name: &str) -> Result<&Variable, ScopeError> {
        let owner = self.resolve(scope, name)?;
        self.record(owner)?
            .variables
            .get(name)
            .ok_or_else(|| ScopeError::Undefined(name.to_string()))
    }

    pub fn update(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<(), ScopeError> {
        let owner = self.resolve(scope, name)?;

        match self.record_mut(owner)?.variables.get_mut(name) {
            Some(variable) if variable.constant => Err(ScopeError::Constant(name.to_string())),
            Some(variable) => {
                variable.value = value;
                Ok(())
            }
            None => Err(ScopeError::Undefined(name.to_string())),
        }
    }

    /// Removes `name` from the scope that defines it. `Ok(false)` when no
    /// scope in the chain does.
    pub fn delete(&mut self, scope: ScopeId, name: &str) -> Result<bool, ScopeError> {
        match self.resolve(scope, name) {
            Ok(owner) => Ok(self.record_mut(owner)?.variables.remove(name).is_some()),
            Err(ScopeError::Undefined(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }
}
