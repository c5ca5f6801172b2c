// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The remotify transformation.
//!
//! [`remotify!`] wraps an ordinary function so that, alongside it, two
//! siblings are emitted: `remote_<name>` submits the call as a job on a
//! remote daemon, runs it, and returns the value; `remote_async_<name>`
//! stops before `start` and returns a [`RemoteCall`] handle. A third
//! emission, `<name>_remotable`, is the server-side adapter a daemon binary
//! registers so its workers can re-apply the function to the deserialized
//! arguments. [`remotify_impl!`] does the same for methods, shipping the
//! serialized receiver under the config's `instance` key.
//!
//! Return values normalize to a sequence: a tuple becomes one element per
//! field, unit becomes empty, anything else a single element. The caller
//! unpacks symmetrically, so `remote_f` returns a tuple iff `f` does.

use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::error::ClientError;
use crate::remotable::RemoteError;
use crate::remote_job::RemoteJob;
use errand_wire::{StatusMap, Value};

/// System plugin that re-applies a remotified free function.
pub const REMOTE_FUNCTION_PLUGIN: &str = "errand.plugins.remote_function";

/// System plugin that re-applies a remotified method to its shipped receiver.
pub const REMOTE_METHOD_PLUGIN: &str = "errand.plugins.remote_method";

/// Where a remote call goes, and how long to wait for it.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    /// `host` or `host:port` of the daemon.
    pub address: String,
    /// Deadline handed to `join`; `None` waits forever.
    pub remote_timeout: Option<Duration>,
}

impl RemoteTarget {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), remote_timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = Some(timeout);
        self
    }
}

impl From<&str> for RemoteTarget {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for RemoteTarget {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

/// Outcome of a typed remote call.
#[derive(Debug, Error)]
pub enum RemoteCallError<E: std::error::Error + 'static> {
    /// The original error, reconstructed from the remote failure's leaf.
    #[error(transparent)]
    Remote(E),

    /// Framework-level failure, or a remote failure whose leaf could not be
    /// reconstructed locally; carries the full chain.
    #[error(transparent)]
    Framework(#[from] ClientError),
}

/// Serialize one argument (or a method receiver) for the wire.
pub fn encode_arg<T: Serialize>(value: &T) -> Result<Value, ClientError> {
    let json = serde_json::to_value(value)
        .map_err(|e| ClientError::Http(format!("argument does not serialize: {e}")))?;
    Ok(Value::from_json(json)?)
}

/// Rebuild a typed return value from the normalized sequence: empty is
/// unit, one element is the value, several are the tuple fields.
pub fn unpack_return_values<R: DeserializeOwned>(values: &[Value]) -> Result<R, ClientError> {
    let json = match values {
        [] => serde_json::Value::Null,
        [single] => single.to_json()?,
        many => {
            let mut items = Vec::with_capacity(many.len());
            for item in many {
                items.push(item.to_json()?);
            }
            serde_json::Value::Array(items)
        }
    };
    serde_json::from_value(json).map_err(|e| {
        ClientError::UnexpectedResponse(format!("return value does not deserialize: {e}"))
    })
}

/// Handle to an asynchronously running remote call.
///
/// Exposes the [`RemoteJob`] interface; `join` additionally materializes the
/// typed return value.
pub struct RemoteCall<R> {
    job: RemoteJob,
    result: PhantomData<fn() -> R>,
}

impl<R: DeserializeOwned> RemoteCall<R> {
    pub fn id(&self) -> &errand_core::JobId {
        self.job.id()
    }

    pub fn start(&mut self) -> Result<bool, ClientError> {
        self.job.start()
    }

    /// Block until the call finishes and return its value.
    pub fn join(&mut self, timeout: Option<Duration>) -> Result<R, ClientError> {
        self.job.join(timeout)?;
        let status = self.job.status(true)?;
        let values = status.get("return_values").and_then(Value::as_array).unwrap_or(&[]);
        unpack_return_values(values)
    }

    /// Like `join`, but a reconstructable remote failure comes back as the
    /// typed error `E`.
    pub fn join_typed<E: RemoteError>(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<R, RemoteCallError<E>> {
        reconstruct_failure(self.join(timeout))
    }

    pub fn running(&mut self, force: bool) -> Result<bool, ClientError> {
        self.job.running(force)
    }

    pub fn finished(&mut self, force: bool) -> Result<bool, ClientError> {
        self.job.finished(force)
    }

    pub fn status(&mut self, force: bool) -> Result<StatusMap, ClientError> {
        self.job.status(force)
    }

    pub fn config(&mut self, force: bool) -> Result<Value, ClientError> {
        self.job.config(force)
    }

    pub fn kill(&mut self, force: bool) -> Result<bool, ClientError> {
        self.job.kill(force)
    }

    pub fn into_job(self) -> RemoteJob {
        self.job
    }
}

/// Create (but do not start) the job carrying a remote call.
pub fn submit<R: DeserializeOwned>(
    target: &RemoteTarget,
    plugin: &str,
    function_name: &str,
    module_name: &str,
    instance: Option<Value>,
    args: Vec<Value>,
) -> Result<RemoteCall<R>, ClientError> {
    tracing::debug!(
        function = function_name,
        module = module_name,
        target = %target.address,
        "submitting remote call"
    );
    let mut config = StatusMap::new();
    config.insert("function_name".to_string(), Value::from(function_name));
    config.insert("module_name".to_string(), Value::from(module_name));
    config.insert("args".to_string(), Value::Array(args));
    if let Some(instance) = instance {
        config.insert("instance".to_string(), instance);
    }
    let job = RemoteJob::create(&target.address, plugin, Value::Map(config))?;
    Ok(RemoteCall { job, result: PhantomData })
}

/// Submit, start, and join a remote call, returning its value.
pub fn call<R: DeserializeOwned>(
    target: &RemoteTarget,
    plugin: &str,
    function_name: &str,
    module_name: &str,
    instance: Option<Value>,
    args: Vec<Value>,
) -> Result<R, ClientError> {
    let mut call = submit(target, plugin, function_name, module_name, instance, args)?;
    call.start()?;
    let value = call.join(target.remote_timeout);
    if let Err(error) = &value {
        tracing::warn!(
            function = function_name,
            target = %target.address,
            error = %error,
            "remote call failed"
        );
    }
    value
}

/// Like [`call`], but a reconstructable remote failure comes back typed.
pub fn call_typed<R: DeserializeOwned, E: RemoteError>(
    target: &RemoteTarget,
    plugin: &str,
    function_name: &str,
    module_name: &str,
    instance: Option<Value>,
    args: Vec<Value>,
) -> Result<R, RemoteCallError<E>> {
    reconstruct_failure(call(target, plugin, function_name, module_name, instance, args))
}

fn reconstruct_failure<R, E: RemoteError>(
    result: Result<R, ClientError>,
) -> Result<R, RemoteCallError<E>> {
    match result {
        Ok(value) => Ok(value),
        Err(ClientError::Remote(failure)) => match failure.reconstruct::<E>() {
            Some(error) => Err(RemoteCallError::Remote(error)),
            None => Err(RemoteCallError::Framework(ClientError::Remote(failure))),
        },
        Err(other) => Err(RemoteCallError::Framework(other)),
    }
}

/// Attach `remote_<name>` and `remote_async_<name>` siblings to a function,
/// plus the `<name>_remotable` server-side adapter.
///
/// Supported return forms: none, `()`, a single type, a tuple, and a literal
/// `Result<..>` whose error type implements [`RemoteError`]. For the
/// `Result` forms `remote_<name>` returns [`RemoteCallError<E>`], so a
/// reconstructable remote failure is re-raised as the original error type.
///
/// ```ignore
/// remotify! {
///     pub fn mul(a: i64, b: f64) -> f64 {
///         a as f64 * b
///     }
/// }
/// // remote_mul("worker-3:5000", 17, 13.5)? == 229.5
/// ```
#[macro_export]
macro_rules! remotify {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( $($arg:ident : $ty:ty),* $(,)? ) -> Result<(), $err:ty> $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($($arg : $ty),*) -> Result<(), $err> $body
        $crate::__remotify_free!(@typed $vis, $name, (), $err, @unit, ($($arg : $ty),*));
    };
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( $($arg:ident : $ty:ty),* $(,)? ) -> Result<($($rty:ty),+ $(,)?), $err:ty> $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($($arg : $ty),*) -> Result<($($rty),+), $err> $body
        $crate::__remotify_free!(@typed $vis, $name, ($($rty),+), $err, @tuple, ($($arg : $ty),*));
    };
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( $($arg:ident : $ty:ty),* $(,)? ) -> Result<$ok:ty, $err:ty> $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($($arg : $ty),*) -> Result<$ok, $err> $body
        $crate::__remotify_free!(@typed $vis, $name, $ok, $err, @single, ($($arg : $ty),*));
    };
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( $($arg:ident : $ty:ty),* $(,)? ) -> () $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($($arg : $ty),*) $body
        $crate::__remotify_free!(@plain $vis, $name, (), @unit, ($($arg : $ty),*));
    };
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( $($arg:ident : $ty:ty),* $(,)? ) -> ($($rty:ty),+ $(,)?) $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($($arg : $ty),*) -> ($($rty),+) $body
        $crate::__remotify_free!(@plain $vis, $name, ($($rty),+), @tuple, ($($arg : $ty),*));
    };
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( $($arg:ident : $ty:ty),* $(,)? ) -> $ret:ty $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($($arg : $ty),*) -> $ret $body
        $crate::__remotify_free!(@plain $vis, $name, $ret, @single, ($($arg : $ty),*));
    };
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( $($arg:ident : $ty:ty),* $(,)? ) $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($($arg : $ty),*) $body
        $crate::__remotify_free!(@plain $vis, $name, (), @unit, ($($arg : $ty),*));
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __remotify_free {
    (@plain $vis:vis, $name:ident, $ret:ty, @$norm:ident, ($($arg:ident : $ty:ty),*)) => {
        $crate::paste::paste! {
            #[doc = concat!("Calls [`", stringify!($name), "`] on a remote machine running an errand daemon.")]
            $vis fn [<remote_ $name>](
                target: impl Into<$crate::remotify::RemoteTarget>,
                $($arg : $ty),*
            ) -> Result<$ret, $crate::error::ClientError> {
                let target = target.into();
                let mut args = Vec::new();
                $( args.push($crate::remotify::encode_arg(&$arg)?); )*
                $crate::remotify::call(
                    &target,
                    $crate::remotify::REMOTE_FUNCTION_PLUGIN,
                    stringify!($name),
                    module_path!(),
                    None,
                    args,
                )
            }

            #[doc = concat!("Returns a handle for running [`", stringify!($name), "`] asynchronously on a remote machine.")]
            $vis fn [<remote_async_ $name>](
                target: impl Into<$crate::remotify::RemoteTarget>,
                $($arg : $ty),*
            ) -> Result<$crate::remotify::RemoteCall<$ret>, $crate::error::ClientError> {
                let target = target.into();
                let mut args = Vec::new();
                $( args.push($crate::remotify::encode_arg(&$arg)?); )*
                $crate::remotify::submit(
                    &target,
                    $crate::remotify::REMOTE_FUNCTION_PLUGIN,
                    stringify!($name),
                    module_path!(),
                    None,
                    args,
                )
            }

            #[doc = concat!("Server-side adapter for [`", stringify!($name), "`]; register it with a daemon's remotable set.")]
            $vis fn [<$name _remotable>]() -> $crate::remotable::Remotable {
                $crate::remotable::Remotable::new(
                    stringify!($name),
                    module_path!(),
                    |_instance, args| {
                        let mut __index = 0usize;
                        $(
                            let $arg: $ty =
                                $crate::remotable::decode_arg(args, __index, stringify!($name))?;
                            __index += 1;
                        )*
                        let _ = __index;
                        let __ret = $name($($arg),*);
                        $crate::__remotify_norm!(@$norm __ret)
                    },
                )
            }
        }
    };
    (@typed $vis:vis, $name:ident, $ret:ty, $err:ty, @$norm:ident, ($($arg:ident : $ty:ty),*)) => {
        $crate::paste::paste! {
            #[doc = concat!("Calls [`", stringify!($name), "`] on a remote machine; a reconstructable remote failure is re-raised as the original error type.")]
            $vis fn [<remote_ $name>](
                target: impl Into<$crate::remotify::RemoteTarget>,
                $($arg : $ty),*
            ) -> Result<$ret, $crate::remotify::RemoteCallError<$err>> {
                let target = target.into();
                let mut args = Vec::new();
                $(
                    args.push(
                        $crate::remotify::encode_arg(&$arg)
                            .map_err($crate::remotify::RemoteCallError::Framework)?,
                    );
                )*
                $crate::remotify::call_typed(
                    &target,
                    $crate::remotify::REMOTE_FUNCTION_PLUGIN,
                    stringify!($name),
                    module_path!(),
                    None,
                    args,
                )
            }

            #[doc = concat!("Returns a handle for running [`", stringify!($name), "`] asynchronously on a remote machine; use `join_typed` to reconstruct its error type.")]
            $vis fn [<remote_async_ $name>](
                target: impl Into<$crate::remotify::RemoteTarget>,
                $($arg : $ty),*
            ) -> Result<$crate::remotify::RemoteCall<$ret>, $crate::error::ClientError> {
                let target = target.into();
                let mut args = Vec::new();
                $( args.push($crate::remotify::encode_arg(&$arg)?); )*
                $crate::remotify::submit(
                    &target,
                    $crate::remotify::REMOTE_FUNCTION_PLUGIN,
                    stringify!($name),
                    module_path!(),
                    None,
                    args,
                )
            }

            #[doc = concat!("Server-side adapter for [`", stringify!($name), "`]; register it with a daemon's remotable set.")]
            $vis fn [<$name _remotable>]() -> $crate::remotable::Remotable {
                $crate::remotable::Remotable::new(
                    stringify!($name),
                    module_path!(),
                    |_instance, args| {
                        let mut __index = 0usize;
                        $(
                            let $arg: $ty =
                                $crate::remotable::decode_arg(args, __index, stringify!($name))?;
                            __index += 1;
                        )*
                        let _ = __index;
                        match $name($($arg),*) {
                            Ok(__ret) => $crate::__remotify_norm!(@$norm __ret),
                            Err(error) => {
                                Err($crate::remotable::RemoteApplyError::from_typed(error))
                            }
                        }
                    },
                )
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __remotify_norm {
    (@unit $val:ident) => {{
        let _ = $val;
        $crate::remotable::unit_return()
    }};
    (@single $val:ident) => {
        $crate::remotable::single_return(&$val)
    };
    (@tuple $val:ident) => {
        $crate::remotable::tuple_return(&$val)
    };
}

/// Attach `remote_*` and `remote_async_*` siblings to the methods of an
/// impl block, plus `<type>_<name>_remotable` server-side adapters.
///
/// The receiver must be `&self` and the type `Serialize + DeserializeOwned`:
/// the instance is serialized and shipped with the call, so the method runs
/// against the caller's state of the object — mutations on the remote side
/// are not reflected back. Adapters register under `Type::method`.
///
/// ```ignore
/// remotify_impl! {
///     impl Calculator {
///         pub fn add(&self, x: i64) -> i64 { self.base + x }
///     }
/// }
/// ```
#[macro_export]
macro_rules! remotify_impl {
    (impl $type:ident { $($methods:tt)* }) => {
        $crate::__remotify_methods!($type; $($methods)*);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __remotify_methods {
    ($type:ident; ) => {};
    (
        $type:ident;
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( &$self_tok:tt $(, $arg:ident : $ty:ty)* $(,)? ) -> Result<(), $err:ty> $body:block
        $($rest:tt)*
    ) => {
        impl $type {
            $(#[$meta])*
            $vis fn $name(&$self_tok, $($arg : $ty),*) -> Result<(), $err> $body
        }
        $crate::__remotify_method!(@typed $type, $vis, $name, (), $err, @unit, ($($arg : $ty),*));
        $crate::__remotify_methods!($type; $($rest)*);
    };
    (
        $type:ident;
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( &$self_tok:tt $(, $arg:ident : $ty:ty)* $(,)? ) -> Result<($($rty:ty),+ $(,)?), $err:ty> $body:block
        $($rest:tt)*
    ) => {
        impl $type {
            $(#[$meta])*
            $vis fn $name(&$self_tok, $($arg : $ty),*) -> Result<($($rty),+), $err> $body
        }
        $crate::__remotify_method!(@typed $type, $vis, $name, ($($rty),+), $err, @tuple, ($($arg : $ty),*));
        $crate::__remotify_methods!($type; $($rest)*);
    };
    (
        $type:ident;
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( &$self_tok:tt $(, $arg:ident : $ty:ty)* $(,)? ) -> Result<$ok:ty, $err:ty> $body:block
        $($rest:tt)*
    ) => {
        impl $type {
            $(#[$meta])*
            $vis fn $name(&$self_tok, $($arg : $ty),*) -> Result<$ok, $err> $body
        }
        $crate::__remotify_method!(@typed $type, $vis, $name, $ok, $err, @single, ($($arg : $ty),*));
        $crate::__remotify_methods!($type; $($rest)*);
    };
    (
        $type:ident;
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( &$self_tok:tt $(, $arg:ident : $ty:ty)* $(,)? ) -> () $body:block
        $($rest:tt)*
    ) => {
        impl $type {
            $(#[$meta])*
            $vis fn $name(&$self_tok, $($arg : $ty),*) $body
        }
        $crate::__remotify_method!(@plain $type, $vis, $name, (), @unit, ($($arg : $ty),*));
        $crate::__remotify_methods!($type; $($rest)*);
    };
    (
        $type:ident;
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( &$self_tok:tt $(, $arg:ident : $ty:ty)* $(,)? ) -> ($($rty:ty),+ $(,)?) $body:block
        $($rest:tt)*
    ) => {
        impl $type {
            $(#[$meta])*
            $vis fn $name(&$self_tok, $($arg : $ty),*) -> ($($rty),+) $body
        }
        $crate::__remotify_method!(@plain $type, $vis, $name, ($($rty),+), @tuple, ($($arg : $ty),*));
        $crate::__remotify_methods!($type; $($rest)*);
    };
    (
        $type:ident;
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( &$self_tok:tt $(, $arg:ident : $ty:ty)* $(,)? ) -> $ret:ty $body:block
        $($rest:tt)*
    ) => {
        impl $type {
            $(#[$meta])*
            $vis fn $name(&$self_tok, $($arg : $ty),*) -> $ret $body
        }
        $crate::__remotify_method!(@plain $type, $vis, $name, $ret, @single, ($($arg : $ty),*));
        $crate::__remotify_methods!($type; $($rest)*);
    };
    (
        $type:ident;
        $(#[$meta:meta])*
        $vis:vis fn $name:ident( &$self_tok:tt $(, $arg:ident : $ty:ty)* $(,)? ) $body:block
        $($rest:tt)*
    ) => {
        impl $type {
            $(#[$meta])*
            $vis fn $name(&$self_tok, $($arg : $ty),*) $body
        }
        $crate::__remotify_method!(@plain $type, $vis, $name, (), @unit, ($($arg : $ty),*));
        $crate::__remotify_methods!($type; $($rest)*);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __remotify_method {
    (@plain $type:ident, $vis:vis, $name:ident, $ret:ty, @$norm:ident, ($($arg:ident : $ty:ty),*)) => {
        $crate::paste::paste! {
            impl $type {
                #[doc = concat!("Calls [`", stringify!($type), "::", stringify!($name), "`] on a remote machine, against this instance's current state.")]
                $vis fn [<remote_ $name>](
                    &self,
                    target: impl Into<$crate::remotify::RemoteTarget>,
                    $($arg : $ty),*
                ) -> Result<$ret, $crate::error::ClientError> {
                    let target = target.into();
                    let instance = $crate::remotify::encode_arg(self)?;
                    let mut args = Vec::new();
                    $( args.push($crate::remotify::encode_arg(&$arg)?); )*
                    $crate::remotify::call(
                        &target,
                        $crate::remotify::REMOTE_METHOD_PLUGIN,
                        concat!(stringify!($type), "::", stringify!($name)),
                        module_path!(),
                        Some(instance),
                        args,
                    )
                }

                #[doc = concat!("Returns a handle for running [`", stringify!($type), "::", stringify!($name), "`] asynchronously on a remote machine.")]
                $vis fn [<remote_async_ $name>](
                    &self,
                    target: impl Into<$crate::remotify::RemoteTarget>,
                    $($arg : $ty),*
                ) -> Result<$crate::remotify::RemoteCall<$ret>, $crate::error::ClientError> {
                    let target = target.into();
                    let instance = $crate::remotify::encode_arg(self)?;
                    let mut args = Vec::new();
                    $( args.push($crate::remotify::encode_arg(&$arg)?); )*
                    $crate::remotify::submit(
                        &target,
                        $crate::remotify::REMOTE_METHOD_PLUGIN,
                        concat!(stringify!($type), "::", stringify!($name)),
                        module_path!(),
                        Some(instance),
                        args,
                    )
                }
            }

            #[doc = concat!("Server-side adapter for [`", stringify!($type), "::", stringify!($name), "`]; register it with a daemon's remotable set.")]
            $vis fn [<$type:snake _ $name _remotable>]() -> $crate::remotable::Remotable {
                $crate::remotable::Remotable::new(
                    concat!(stringify!($type), "::", stringify!($name)),
                    module_path!(),
                    |instance, args| {
                        let __self: $type = $crate::remotable::decode_instance(
                            instance,
                            concat!(stringify!($type), "::", stringify!($name)),
                        )?;
                        let mut __index = 0usize;
                        $(
                            let $arg: $ty = $crate::remotable::decode_arg(
                                args,
                                __index,
                                concat!(stringify!($type), "::", stringify!($name)),
                            )?;
                            __index += 1;
                        )*
                        let _ = __index;
                        let __ret = __self.$name($($arg),*);
                        $crate::__remotify_norm!(@$norm __ret)
                    },
                )
            }
        }
    };
    (@typed $type:ident, $vis:vis, $name:ident, $ret:ty, $err:ty, @$norm:ident, ($($arg:ident : $ty:ty),*)) => {
        $crate::paste::paste! {
            impl $type {
                #[doc = concat!("Calls [`", stringify!($type), "::", stringify!($name), "`] on a remote machine; a reconstructable remote failure is re-raised as the original error type.")]
                $vis fn [<remote_ $name>](
                    &self,
                    target: impl Into<$crate::remotify::RemoteTarget>,
                    $($arg : $ty),*
                ) -> Result<$ret, $crate::remotify::RemoteCallError<$err>> {
                    let target = target.into();
                    let instance = $crate::remotify::encode_arg(self)
                        .map_err($crate::remotify::RemoteCallError::Framework)?;
                    let mut args = Vec::new();
                    $(
                        args.push(
                            $crate::remotify::encode_arg(&$arg)
                                .map_err($crate::remotify::RemoteCallError::Framework)?,
                        );
                    )*
                    $crate::remotify::call_typed(
                        &target,
                        $crate::remotify::REMOTE_METHOD_PLUGIN,
                        concat!(stringify!($type), "::", stringify!($name)),
                        module_path!(),
                        Some(instance),
                        args,
                    )
                }

                #[doc = concat!("Returns a handle for running [`", stringify!($type), "::", stringify!($name), "`] asynchronously on a remote machine; use `join_typed` to reconstruct its error type.")]
                $vis fn [<remote_async_ $name>](
                    &self,
                    target: impl Into<$crate::remotify::RemoteTarget>,
                    $($arg : $ty),*
                ) -> Result<$crate::remotify::RemoteCall<$ret>, $crate::error::ClientError> {
                    let target = target.into();
                    let instance = $crate::remotify::encode_arg(self)?;
                    let mut args = Vec::new();
                    $( args.push($crate::remotify::encode_arg(&$arg)?); )*
                    $crate::remotify::submit(
                        &target,
                        $crate::remotify::REMOTE_METHOD_PLUGIN,
                        concat!(stringify!($type), "::", stringify!($name)),
                        module_path!(),
                        Some(instance),
                        args,
                    )
                }
            }

            #[doc = concat!("Server-side adapter for [`", stringify!($type), "::", stringify!($name), "`]; register it with a daemon's remotable set.")]
            $vis fn [<$type:snake _ $name _remotable>]() -> $crate::remotable::Remotable {
                $crate::remotable::Remotable::new(
                    concat!(stringify!($type), "::", stringify!($name)),
                    module_path!(),
                    |instance, args| {
                        let __self: $type = $crate::remotable::decode_instance(
                            instance,
                            concat!(stringify!($type), "::", stringify!($name)),
                        )?;
                        let mut __index = 0usize;
                        $(
                            let $arg: $ty = $crate::remotable::decode_arg(
                                args,
                                __index,
                                concat!(stringify!($type), "::", stringify!($name)),
                            )?;
                            __index += 1;
                        )*
                        let _ = __index;
                        match __self.$name($($arg),*) {
                            Ok(__ret) => $crate::__remotify_norm!(@$norm __ret),
                            Err(error) => {
                                Err($crate::remotable::RemoteApplyError::from_typed(error))
                            }
                        }
                    },
                )
            }
        }
    };
}

#[cfg(test)]
#[path = "remotify_tests.rs"]
mod tests;
