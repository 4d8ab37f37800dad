// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros shared by the workspace crates.

/// Give a fieldless enum a `name()` returning its wire name, and a
/// `Display` that writes it.
///
/// ```ignore
/// bbr_core::simple_display! {
///     ArtifactKind {
///         Backup => "backup",
///         Restore => "restore",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ident { $( $variant:ident => $name:literal ),+ $(,)? }) => {
        impl $enum {
            pub const fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }
        }

        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Chainable setters for use inside an `impl` block.
///
/// `into` setters take `impl Into<T>`, `set` setters take `T`, and `option`
/// setters store `Some(v.into())` in an `Option<T>` field.
///
/// ```ignore
/// impl SshConfig {
///     bbr_core::setters! {
///         into { ssh_bin: String }
///         set { port: u16 }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        $(into { $( $into:ident : $into_ty:ty ),* $(,)? })?
        $(set { $( $set:ident : $set_ty:ty ),* $(,)? })?
        $(option { $( $opt:ident : $opt_ty:ty ),* $(,)? })?
    ) => {
        $($(
            pub fn $into(mut self, value: impl Into<$into_ty>) -> Self {
                self.$into = value.into();
                self
            }
        )*)?
        $($(
            pub fn $set(mut self, value: $set_ty) -> Self {
                self.$set = value;
                self
            }
        )*)?
        $($(
            pub fn $opt(mut self, value: impl Into<$opt_ty>) -> Self {
                self.$opt = Some(value.into());
                self
            }
        )*)?
    };
}

/// A test-only builder for `$target` whose fields mirror the target's.
///
/// Every field gets a default and a setter from [`setters!`]; `build()`
/// moves them into the target. Nothing is generated outside tests and the
/// `test-support` feature.
#[macro_export]
macro_rules! builder {
    (
        pub struct $builder:ident => $target:ident {
            into { $( $into:ident : $into_ty:ty = $into_default:expr ),* $(,)? }
            set { $( $set:ident : $set_ty:ty = $set_default:expr ),* $(,)? }
            option { $( $opt:ident : $opt_ty:ty ),* $(,)? }
        }
    ) => {
        #[cfg(any(test, feature = "test-support"))]
        pub struct $builder {
            $( $into: $into_ty, )*
            $( $set: $set_ty, )*
            $( $opt: Option<$opt_ty>, )*
        }

        #[cfg(any(test, feature = "test-support"))]
        impl Default for $builder {
            fn default() -> Self {
                Self {
                    $( $into: $into_default.into(), )*
                    $( $set: $set_default, )*
                    $( $opt: None, )*
                }
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $crate::setters! {
                into { $( $into: $into_ty ),* }
                set { $( $set: $set_ty ),* }
                option { $( $opt: $opt_ty ),* }
            }

            pub fn build(self) -> $target {
                $target {
                    $( $into: self.$into, )*
                    $( $set: self.$set, )*
                    $( $opt: self.$opt, )*
                }
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $target {
            pub fn builder() -> $builder {
                $builder::default()
            }
        }
    };
}
