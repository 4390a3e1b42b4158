//! `#[derive(Describe)]` expansion.
//!
//! The derive emits a static descriptor table for the type: its identity,
//! component name, visibility, and for structs one `FieldDef` per field with
//! the field's tags. Tags come from `#[describe(key = "value")]`; the `json`
//! tag is derived from serde attributes when not given explicitly, and doc
//! comments fill in `description`.
//!
//! ```ignore
//! #[derive(Describe)]
//! #[serde(rename_all = "camelCase")]
//! pub struct FindPetsParams {
//!     /// Status values to filter by.
//!     #[describe(query = "status", default = "available")]
//!     pub status: String,
//!     pub page_size: i32,
//! }
//! ```
//!
//! gives `status` the tags `query`, `default` and `description`, and
//! `page_size` the tag `json = "pageSize"`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericParam, Visibility, parse_quote};

use crate::attrs::{ContainerAttrs, FieldAttrs};
use crate::rename::{RenameRule, strip_raw_prefix};

/// Tags that make a field a request parameter rather than a body property.
const LOCATION_TAGS: [&str; 3] = ["path", "query", "header"];

/// One entry of the generated field table.
#[derive(Debug)]
pub struct FieldModel {
    pub name: String,
    pub exported: bool,
    pub embedded: bool,
    pub tags: Vec<(String, String)>,
    pub ty: syn::Type,
}

impl FieldModel {
    /// `None` for fields marked `#[describe(skip)]`.
    pub fn from_field(
        field: &syn::Field,
        rename_all: Option<RenameRule>,
    ) -> syn::Result<Option<Self>> {
        let attrs = FieldAttrs::from_attrs(&field.attrs)?;
        if attrs.skip {
            return Ok(None);
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let name = strip_raw_prefix(&ident.to_string()).to_string();
        let tags = field_tags(&name, &attrs, rename_all);
        Ok(Some(Self {
            name,
            exported: !matches!(field.vis, Visibility::Inherited),
            embedded: attrs.flatten,
            tags,
            ty: field.ty.clone(),
        }))
    }

    fn to_tokens(&self) -> TokenStream {
        let name = &self.name;
        let exported = self.exported;
        let embedded = self.embedded;
        let keys = self.tags.iter().map(|(key, _)| key);
        let values = self.tags.iter().map(|(_, value)| value);
        // Private fields are never introspected, so their types need not
        // implement Describe.
        let ty = if exported || embedded {
            let ty = &self.ty;
            quote!(::core::option::Option::Some(
                <#ty as ::tailor::Describe>::describe as fn() -> ::tailor::TypeDescriptor
            ))
        } else {
            quote!(::core::option::Option::None)
        };
        quote! {
            ::tailor::FieldDef {
                name: ::core::option::Option::Some(#name),
                exported: #exported,
                embedded: #embedded,
                tags: &[#((#keys, #values)),*],
                ty: #ty,
            }
        }
    }
}

/// Tags of a field: the explicit ones in written order, then the derived
/// `json` and `description` tags.
pub fn field_tags(
    name: &str,
    attrs: &FieldAttrs,
    rename_all: Option<RenameRule>,
) -> Vec<(String, String)> {
    let mut tags = attrs.tags.clone();
    if attrs.not_serialized {
        tags.retain(|(key, _)| key != "json");
        tags.push(("json".to_string(), "-".to_string()));
    } else if !attrs.has_tag("json") && !LOCATION_TAGS.iter().any(|tag| attrs.has_tag(tag)) {
        let json = attrs.rename.clone().unwrap_or_else(|| {
            rename_all.map_or_else(|| name.to_string(), |rule| rule.apply_to_field(name))
        });
        tags.push(("json".to_string(), json));
    }
    if !attrs.has_tag("description")
        && let Some(doc) = &attrs.doc
    {
        tags.push(("description".to_string(), doc.clone()));
    }
    tags
}

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Describe cannot be derived for types with lifetime parameters",
        ));
    }

    let container = ContainerAttrs::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let name = if container.inline {
        quote!(::core::option::Option::None)
    } else {
        let name = container
            .name
            .clone()
            .unwrap_or_else(|| strip_raw_prefix(&ident.to_string()).to_string());
        quote!(::core::option::Option::Some(#name))
    };
    let exported = !matches!(input.vis, Visibility::Inherited);

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => {
                let mut fields = Vec::new();
                for field in &named.named {
                    if let Some(model) = FieldModel::from_field(field, container.rename_all)? {
                        fields.push(model);
                    }
                }
                struct_body(&name, exported, &fields)
            }
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                let inner = &unnamed.unnamed[0].ty;
                quote! {
                    <#inner as ::tailor::Describe>::describe().relabel(
                        ::core::any::TypeId::of::<Self>(),
                        ::core::any::type_name::<Self>(),
                        #name,
                        #exported,
                    )
                }
            }
            Fields::Unnamed(unnamed) if unnamed.unnamed.is_empty() => {
                struct_body(&name, exported, &[])
            }
            Fields::Unit => struct_body(&name, exported, &[]),
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new_spanned(
                    unnamed,
                    "Describe supports tuple structs with exactly one field",
                ));
            }
        },
        Data::Enum(data) => {
            if let Some(variant) = data
                .variants
                .iter()
                .find(|variant| !matches!(variant.fields, Fields::Unit))
            {
                return Err(syn::Error::new_spanned(
                    variant,
                    "Describe only supports enums whose variants carry no data",
                ));
            }
            quote! {
                ::tailor::TypeDescriptor::from_info(::tailor::TypeInfo {
                    name: #name,
                    exported: #exported,
                    ..::tailor::TypeInfo::scalar::<Self>(::tailor::Kind::String)
                })
            }
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Describe cannot be derived for unions",
            ));
        }
    };

    let mut generics = input.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::tailor::Describe));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::tailor::Describe for #ident #ty_generics #where_clause {
            fn describe() -> ::tailor::TypeDescriptor {
                #body
            }
        }
    })
}

fn struct_body(name: &TokenStream, exported: bool, fields: &[FieldModel]) -> TokenStream {
    let entries = fields.iter().map(FieldModel::to_tokens);
    quote! {
        ::tailor::TypeDescriptor::from_info(::tailor::TypeInfo {
            id: ::core::any::TypeId::of::<Self>(),
            type_name: ::core::any::type_name::<Self>(),
            name: #name,
            exported: #exported,
            kind: ::tailor::Kind::Struct,
            element: ::core::option::Option::None,
            fields: ::core::option::Option::Some(
                (|| ::std::vec![#(#entries),*]) as fn() -> ::std::vec::Vec<::tailor::FieldDef>
            ),
        })
    }
}
