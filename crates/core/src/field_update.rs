//! Tri-state update value for optional fields.
//!
//! A partial update must distinguish "leave this field alone" from "clear this
//! field". `Option<Option<T>>` can express that but reads poorly at call
//! sites, so updates use [`FieldUpdate`] instead.
//!
//! JSON mapping (with `#[serde(default)]` on the containing field):
//!
//! | JSON            | Value                  |
//! |-----------------|------------------------|
//! | field absent    | `FieldUpdate::Unchanged` |
//! | `null`          | `FieldUpdate::Clear`   |
//! | any other value | `FieldUpdate::Set(v)`  |

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    /// `None` when unchanged, otherwise the new value (`None` meaning cleared).
    pub fn as_change(&self) -> Option<Option<&T>> {
        match self {
            FieldUpdate::Unchanged => None,
            FieldUpdate::Set(v) => Some(Some(v)),
            FieldUpdate::Clear => Some(None),
        }
    }

    /// Apply the update on top of the current value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Unchanged => current,
            FieldUpdate::Set(v) => Some(v),
            FieldUpdate::Clear => None,
        }
    }

    /// Split into the `(changed, value)` pair bound by SQL
    /// `CASE WHEN $changed THEN $value ELSE column END` updates.
    pub fn into_bind_pair(self) -> (bool, Option<T>) {
        match self {
            FieldUpdate::Unchanged => (false, None),
            FieldUpdate::Set(v) => (true, Some(v)),
            FieldUpdate::Clear => (true, None),
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Clear,
        })
    }
}
