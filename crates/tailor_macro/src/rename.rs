//! serde's `rename_all` rules, applied to field names.

/// Strips the `r#` prefix from raw identifiers.
/// E.g., `r#type` becomes `type`.
pub fn strip_raw_prefix(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    LowerCase,
    UpperCase,
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
    ScreamingKebabCase,
}

impl RenameRule {
    pub const ALL: [(&'static str, Self); 8] = [
        ("lowercase", Self::LowerCase),
        ("UPPERCASE", Self::UpperCase),
        ("PascalCase", Self::PascalCase),
        ("camelCase", Self::CamelCase),
        ("snake_case", Self::SnakeCase),
        ("SCREAMING_SNAKE_CASE", Self::ScreamingSnakeCase),
        ("kebab-case", Self::KebabCase),
        ("SCREAMING-KEBAB-CASE", Self::ScreamingKebabCase),
    ];

    pub fn parse(rule: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(name, _)| *name == rule)
            .map(|(_, rule)| *rule)
    }

    /// Rename a snake_case field the way serde does.
    pub fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::LowerCase | Self::SnakeCase => field.to_string(),
            Self::UpperCase | Self::ScreamingSnakeCase => field.to_ascii_uppercase(),
            Self::PascalCase => {
                let mut pascal = String::new();
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            Self::CamelCase => {
                let pascal = Self::PascalCase.apply_to_field(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::KebabCase => field.replace('_', "-"),
            Self::ScreamingKebabCase => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}
