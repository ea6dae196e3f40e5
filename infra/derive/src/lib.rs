#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros for the Herald workspace.
//!
//! * [`macro@herald_error`] turns an enum into a context-aware error type.
//! * [`macro@Event`] tags a data type as an event shape that can travel over a bus.
//!
//! The examples below are `ignore`d because proc-macro crates cannot use their
//! own macros in doctests; the consuming crates carry the real tests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// A high-level attribute macro for defining domain-specific error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a source field
///   (named `source`, or marked `#[source]`), enabling the `?` operator.
/// * **Formatting Helper**: Emits a module-local `format_context` function for use in
///   `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants with a source field must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use herald_derive::herald_error;
/// use std::borrow::Cow;
///
/// #[herald_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Corrupted record{}: {message}", format_context(.context))]
///     Corrupted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<Vec<u8>, StoreError> {
///     Ok(std::fs::read("records.bin").context("Reading the record file")?)
/// }
/// ```
#[proc_macro_attribute]
pub fn herald_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(&input).unwrap_or_else(syn::Error::into_compile_error).into()
}

/// Derives the `herald_event_bus::Event` marker trait.
///
/// Only `'static + Send + Sync` types can be events; the trait bounds enforce it
/// at the implementation site.
///
/// # Example
///
/// ```rust,ignore
/// use herald_event_bus::Event;
///
/// #[derive(Debug, Clone, Event)]
/// struct Ping {
///     value: i32,
/// }
/// ```
#[proc_macro_derive(Event)]
pub fn derive_event(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::event::expand_derive(&input).into()
}
