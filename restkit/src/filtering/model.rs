use serde_json::{Map, Value as JsonValue};

use super::{Bound, FilterError, FilterValue};

/// A source of per-field match criteria.
///
/// Implement this on request DTOs that already know their criteria, or use
/// [`FilterSet`].
pub trait Filter {
    /// Field/criterion pairs, applied in order and combined with `AND`
    fn fields(&self) -> Vec<(&str, &FilterValue)>;

    /// Table qualifier for unqualified field names; `None` means the entity's own table
    fn relationship_alias(&self) -> Option<&str> {
        None
    }

    /// Default cap on the number of rows; pagination overrides it
    fn collection_max_size(&self) -> Option<u64> {
        None
    }
}

/// The stock [`Filter`]: an insertion-ordered field map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    fields: Vec<(String, FilterValue)>,
    alias: Option<String>,
    max_size: Option<u64>,
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the criterion for `field`, replacing any earlier one.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    #[must_use]
    pub fn equals(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(field, value)
    }

    #[must_use]
    pub fn range(
        self,
        field: impl Into<String>,
        from: Option<impl Into<Bound>>,
        to: Option<impl Into<Bound>>,
    ) -> Self {
        self.with(field, FilterValue::range(from, to))
    }

    #[must_use]
    pub fn like(self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.with(field, FilterValue::partial(text))
    }

    #[must_use]
    pub fn is_null(self, field: impl Into<String>) -> Self {
        self.with(field, FilterValue::Empty)
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn with_collection_max_size(mut self, max_size: Option<u64>) -> Self {
        self.max_size = max_size;
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Parse the JSON `filter` query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidJson`] when the input is not a JSON object,
    /// or the error of the first unsupported value.
    pub fn from_json_str(raw: &str) -> Result<Self, FilterError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let object: Map<String, JsonValue> =
            serde_json::from_str(trimmed).map_err(|e| FilterError::InvalidJson(e.to_string()))?;
        Self::from_json_map(&object)
    }

    /// # Errors
    ///
    /// Returns the error of the first value that has no translation.
    pub fn from_json_map(object: &Map<String, JsonValue>) -> Result<Self, FilterError> {
        let mut set = Self::new();
        for (field, value) in object {
            set.insert(field.clone(), FilterValue::from_json(field, value)?);
        }
        Ok(set)
    }
}

impl Filter for FilterSet {
    fn fields(&self) -> Vec<(&str, &FilterValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect()
    }

    fn relationship_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn collection_max_size(&self) -> Option<u64> {
        self.max_size
    }
}
