// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-side adapters for remotified callables.
//!
//! A [`Remotable`] is the named adapter a daemon registers so that
//! `remote_*` calls can re-apply the original function to deserialized
//! arguments. The opaque-object transport of older designs is replaced by
//! named adapters with explicit serde bounds: what travels is the function
//! name, an argument sequence, and (for methods) the serialized receiver.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::error::RemoteFailure;
use errand_wire::Value;

/// An error type that can travel through a failure record and be
/// re-instantiated on the caller's machine.
///
/// `KIND` is the type tag carried in the failure leaf; it must be unique
/// across the error types a deployment transports.
pub trait RemoteError:
    std::error::Error + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: &'static str;
}

/// A remote failure can itself travel through another remote call; the
/// executing side recognizes this tag and splices the chain back together.
impl RemoteError for RemoteFailure {
    const KIND: &'static str = "RemoteFailure";
}

/// Errors from applying a remotable to wire arguments.
#[derive(Debug, Error)]
pub enum RemoteApplyError {
    #[error("no remotable named '{0}' is registered")]
    Unknown(String),

    #[error("argument {index} of '{name}' does not deserialize: {reason}")]
    BadArgument { name: String, index: usize, reason: String },

    #[error("instance for '{0}' does not deserialize: {1}")]
    BadInstance(String, String),

    #[error("'{0}' requires an instance and none was supplied")]
    MissingInstance(String),

    #[error("return value does not serialize: {0}")]
    BadReturn(String),

    /// The call itself failed with a transportable error.
    #[error("{message}")]
    Failed {
        type_name: String,
        message: String,
        exception_object: Option<serde_json::Value>,
    },
}

impl RemoteApplyError {
    /// Capture a typed error with its tag and serialized object, so the
    /// caller's machine can reconstruct it.
    pub fn from_typed<E: RemoteError>(error: E) -> Self {
        let exception_object = serde_json::to_value(&error).ok();
        Self::Failed {
            type_name: E::KIND.to_string(),
            message: error.to_string(),
            exception_object,
        }
    }
}

type ApplyFn = dyn Fn(Option<&Value>, &[Value]) -> Result<Vec<Value>, RemoteApplyError>
    + Send
    + Sync;

/// A named adapter around a remotified callable.
pub struct Remotable {
    name: &'static str,
    module: &'static str,
    apply: Box<ApplyFn>,
}

impl Remotable {
    pub fn new(
        name: &'static str,
        module: &'static str,
        apply: impl Fn(Option<&Value>, &[Value]) -> Result<Vec<Value>, RemoteApplyError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self { name, module, apply: Box::new(apply) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Module the callable was defined in; recorded for diagnostics.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Apply the callable to wire arguments, returning the normalized
    /// return-value sequence.
    pub fn apply(
        &self,
        instance: Option<&Value>,
        args: &[Value],
    ) -> Result<Vec<Value>, RemoteApplyError> {
        (self.apply)(instance, args)
    }
}

impl std::fmt::Debug for Remotable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remotable")
            .field("name", &self.name)
            .field("module", &self.module)
            .finish()
    }
}

/// Attachment refused: generated names would collide with the callable's.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unable to add remote capability to function {0}: function cannot begin \
     with \"remote_\" or \"async_\""
)]
pub struct NameClash(pub String);

/// The set of remotables a daemon executes against.
#[derive(Default)]
pub struct RemotableSet {
    inner: RwLock<HashMap<&'static str, Arc<Remotable>>>,
}

impl RemotableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. Names beginning with `remote_` or `async_` are
    /// refused; re-inserting an already-registered name is a no-op, so
    /// repeated attachment cannot double-wrap.
    pub fn insert(&self, remotable: Remotable) -> Result<(), NameClash> {
        if remotable.name.starts_with("remote_") || remotable.name.starts_with("async_") {
            return Err(NameClash(remotable.name.to_string()));
        }
        let mut inner = self.inner.write();
        if !inner.contains_key(remotable.name) {
            inner.insert(remotable.name, Arc::new(remotable));
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Remotable>> {
        self.inner.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.inner.read().keys().map(|name| name.to_string()).collect();
        names.sort();
        names
    }
}

/// Deserialize positional argument `index`, absent arguments reading as null.
pub fn decode_arg<T: DeserializeOwned>(
    args: &[Value],
    index: usize,
    name: &str,
) -> Result<T, RemoteApplyError> {
    let bad = |reason: String| RemoteApplyError::BadArgument {
        name: name.to_string(),
        index,
        reason,
    };
    let json = match args.get(index) {
        Some(value) => value.to_json().map_err(|e| bad(e.to_string()))?,
        None => serde_json::Value::Null,
    };
    serde_json::from_value(json).map_err(|e| bad(e.to_string()))
}

/// Deserialize the shipped receiver for a method call.
pub fn decode_instance<T: DeserializeOwned>(
    instance: Option<&Value>,
    name: &str,
) -> Result<T, RemoteApplyError> {
    let value = instance.ok_or_else(|| RemoteApplyError::MissingInstance(name.to_string()))?;
    let json = value
        .to_json()
        .map_err(|e| RemoteApplyError::BadInstance(name.to_string(), e.to_string()))?;
    serde_json::from_value(json)
        .map_err(|e| RemoteApplyError::BadInstance(name.to_string(), e.to_string()))
}

fn to_wire<T: Serialize>(value: &T) -> Result<Value, RemoteApplyError> {
    let json = serde_json::to_value(value)
        .map_err(|e| RemoteApplyError::BadReturn(e.to_string()))?;
    Value::from_json(json).map_err(|e| RemoteApplyError::BadReturn(e.to_string()))
}

/// Unit return: an empty sequence, unpacked to `()` by the caller.
pub fn unit_return() -> Result<Vec<Value>, RemoteApplyError> {
    Ok(Vec::new())
}

/// Single return: one element regardless of the value's own shape, so a
/// returned collection stays one value.
pub fn single_return<T: Serialize>(value: &T) -> Result<Vec<Value>, RemoteApplyError> {
    Ok(vec![to_wire(value)?])
}

/// Tuple return: one element per field, so the caller rebuilds the tuple
/// bit-for-bit.
pub fn tuple_return<T: Serialize>(value: &T) -> Result<Vec<Value>, RemoteApplyError> {
    match to_wire(value)? {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}

#[cfg(test)]
#[path = "remotable_tests.rs"]
mod tests;
