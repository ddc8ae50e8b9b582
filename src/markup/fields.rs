use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Positional(String),
    Keyed { key: String, value: String },
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Positional(text) => f.write_str(text),
            Field::Keyed { key, value } => write!(f, "{}={}", key, value),
        }
    }
}

impl Field {
    pub(crate) fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_once('=') {
            Some((key, value)) => Field::Keyed {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => Field::Positional(raw.to_string()),
        }
    }

    /// True only for a positional field with no text, as produced by `||`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Positional(text) if text.is_empty())
    }

    pub fn as_positional(&self) -> Option<&str> {
        match self {
            Field::Positional(text) => Some(text),
            Field::Keyed { .. } => None,
        }
    }
}

/// The `|`-separated fields of a template payload, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn non_empty(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_empty())
    }

    pub fn positional(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(Field::as_positional)
    }

    /// Value of the first field keyed `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            Field::Keyed { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }
}

pub fn decode_fields(payload: &str) -> FieldList {
    FieldList {
        fields: payload.split('|').map(Field::parse).collect(),
    }
}
