// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prefixed identifier newtypes.
//!
//! Generated identifiers are `{prefix}{nanoid}` where the prefix is a
//! 4-character type indicator and the suffix is a 19-character random id.
//! `from_string` accepts any string so identifiers received over the wire
//! round-trip unchanged.

/// Define a newtype identifier with a type prefix.
///
/// Generates `new()` for random generation, `from_string()` for parsing,
/// `as_str()`, `Display`, `From<&str>`/`From<String>`, `AsRef<str>`, and
/// `Borrow<str>` implementations.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct JobId("job-");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random identifier with the type prefix.
            pub fn new() -> Self {
                Self(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19)))
            }

            /// Create an identifier from an existing string.
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

crate::define_id! {
    /// Unique identifier for a job instance, allocated at creation.
    ///
    /// Distinct from the job's [`AuthToken`]: the id is public, the token
    /// is the per-job shared secret.
    pub struct JobId("job-");
}

crate::define_id! {
    /// Per-job shared secret gating status updates.
    ///
    /// Generated alongside the job id; handed to the worker process and
    /// never rendered in the job's external view.
    pub struct AuthToken("key-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
