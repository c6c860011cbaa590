use serde::{Deserialize, Deserializer};

/// A field of a partial-update payload.
///
/// Combine with `#[serde(default)]` so an absent key stays `Omitted` while an
/// explicit `null` becomes `Null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Omitted,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Omitted
    }
}

impl<T> Patch<T> {
    /// Shape for a nullable column: outer `None` leaves the column alone.
    pub fn into_nullable(self) -> Option<Option<T>> {
        match self {
            Patch::Omitted => None,
            Patch::Null => Some(None),
            Patch::Value(value) => Some(Some(value)),
        }
    }

    /// Shape for a `NOT NULL` column; an explicit null is rejected.
    pub fn into_required(self, field: &str) -> Result<Option<T>, String> {
        match self {
            Patch::Omitted => Ok(None),
            Patch::Null => Err(format!("{field} cannot be null")),
            Patch::Value(value) => Ok(Some(value)),
        }
    }
}

impl Patch<String> {
    /// Trims the supplied text; blank strings clear the field.
    pub fn trimmed(self) -> Patch<String> {
        match self {
            Patch::Value(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Patch::Null
                } else {
                    Patch::Value(trimmed.to_string())
                }
            }
            other => other,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}
