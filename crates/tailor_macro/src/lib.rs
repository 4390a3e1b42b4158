mod attrs;
mod describe_impl;
mod rename;

use proc_macro::TokenStream;

/// Derive macro for `tailor::Describe`
///
/// Container attributes:
/// - `#[describe(name = "...")]` overrides the component name
/// - `#[describe(inline)]` makes the type anonymous, so it is always expanded in place
/// - `#[serde(rename_all = "...")]` renames field JSON names
///
/// Field attributes:
/// - `#[describe(key = "value", ...)]` adds tags such as `path`, `query`,
///   `header`, `json`, `description`, `default` or `validate`
/// - `#[describe(skip)]` leaves the field out entirely
/// - `#[describe(flatten)]` or `#[serde(flatten)]` splices the field's own fields in
/// - `#[serde(rename = "...")]`, `#[serde(skip)]` and `#[serde(skip_serializing)]`
///   shape the `json` tag
/// - doc comments become the `description` tag
#[proc_macro_derive(Describe, attributes(describe, serde))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    describe_impl::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
