//! `#[describe(...)]`, `#[serde(...)]` and doc comment attributes.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Token};

use crate::rename::RenameRule;

/// Attributes on the struct or enum itself.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    /// `#[describe(name = "...")]`
    pub name: Option<String>,
    /// `#[describe(inline)]`
    pub inline: bool,
    /// `#[serde(rename_all = "...")]`
    pub rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident("describe") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        let lit: LitStr = meta.value()?.parse()?;
                        out.name = Some(lit.value());
                        Ok(())
                    } else if meta.path.is_ident("inline") {
                        out.inline = true;
                        Ok(())
                    } else {
                        Err(meta.error("unknown describe attribute, expected `name` or `inline`"))
                    }
                })?;
            } else if attr.path().is_ident("serde") {
                let mut rename_all = None;
                // serde validates its own attributes
                let _ = attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        rename_all = serialize_value(&meta)?;
                    } else {
                        skip_value(&meta)?;
                    }
                    Ok(())
                });
                if let Some(lit) = rename_all {
                    let rule = RenameRule::parse(&lit.value()).ok_or_else(|| {
                        syn::Error::new(lit.span(), format!("unknown rename rule `{}`", lit.value()))
                    })?;
                    out.rename_all = Some(rule);
                }
            }
        }
        Ok(out)
    }
}

/// Attributes on one struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// `#[describe(skip)]`: not part of the field table at all
    pub skip: bool,
    /// `#[describe(flatten)]` or `#[serde(flatten)]`
    pub flatten: bool,
    /// `key = "value"` pairs from `#[describe(...)]`, in written order
    pub tags: Vec<(String, String)>,
    /// `#[serde(rename = "...")]`
    pub rename: Option<String>,
    /// `#[serde(skip)]` or `#[serde(skip_serializing)]`
    pub not_serialized: bool,
    pub doc: Option<String>,
}

impl FieldAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self {
            doc: extract_doc_comment(attrs),
            ..Self::default()
        };
        for attr in attrs {
            if attr.path().is_ident("describe") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        out.skip = true;
                    } else if meta.path.is_ident("flatten") {
                        out.flatten = true;
                    } else if let Some(key) = meta.path.get_ident() {
                        let key = key.to_string();
                        let lit: LitStr = meta.value()?.parse()?;
                        out.tags.push((key, lit.value()));
                    } else {
                        return Err(meta.error(
                            "expected `skip`, `flatten` or `key = \"value\"` in describe attribute",
                        ));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                let _ = attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        if let Some(lit) = serialize_value(&meta)? {
                            out.rename = Some(lit.value());
                        }
                    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                        out.not_serialized = true;
                    } else if meta.path.is_ident("flatten") {
                        out.flatten = true;
                    } else {
                        skip_value(&meta)?;
                    }
                    Ok(())
                });
            }
        }
        Ok(out)
    }

    /// Last value written for `key`
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|(k, _)| k == key)
    }
}

/// The serialize-side value of `key = "..."` or `key(serialize = "...")`.
fn serialize_value(meta: &ParseNestedMeta<'_>) -> syn::Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse()?));
    }
    let mut found: Option<LitStr> = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            found = Some(inner.value()?.parse()?);
        } else {
            skip_value(&inner)?;
        }
        Ok(())
    })?;
    Ok(found)
}

/// Consume the value of a meta item this macro does not use.
fn skip_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_value(&inner))?;
    }
    Ok(())
}

/// Extract doc comments from attributes.
/// Returns concatenated doc comment string or None if no doc comments.
pub fn extract_doc_comment(attrs: &[Attribute]) -> Option<String> {
    let mut doc_lines = Vec::new();

    for attr in attrs {
        if attr.path().is_ident("doc")
            && let syn::Meta::NameValue(meta_nv) = &attr.meta
            && let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit_str),
                ..
            }) = &meta_nv.value
        {
            let line = lit_str.value();
            // Trim leading space that rustdoc adds
            let trimmed = line.strip_prefix(' ').unwrap_or(&line);
            doc_lines.push(trimmed.to_string());
        }
    }

    let doc = doc_lines.join("\n");
    let doc = doc.trim();
    (!doc.is_empty()).then(|| doc.to_string())
}
