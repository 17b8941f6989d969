use sea_orm::Order;

use super::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive `asc` / `desc`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidSort`] for any other input.
    pub fn parse(raw: &str) -> Result<Self, FilterError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(FilterError::InvalidSort(format!(
                "unknown direction '{other}'"
            ))),
        }
    }
}

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        }
    }
}

/// A caller-supplied ordered mapping of field to direction.
pub trait OrderSource {
    fn order(&self) -> Vec<(&str, Direction)>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering(Vec<(String, Direction)>);

impl Ordering {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sort key. A field already present keeps its original position.
    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        let field = field.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = direction,
            None => self.0.push((field, direction)),
        }
        self
    }

    #[must_use]
    pub fn asc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Asc)
    }

    #[must_use]
    pub fn desc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Desc)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the `sort` query parameter.
    ///
    /// Accepts `name,-price` (leading `-` is descending), a single
    /// `["name", "DESC"]` pair, or a list of such pairs.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidSort`] for malformed input.
    pub fn parse(raw: &str) -> Result<Self, FilterError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::new());
        }
        if raw.starts_with('[') {
            return Self::parse_json(raw);
        }

        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .try_fold(Self::new(), |ordering, part| {
                let (field, direction) = part
                    .strip_prefix('-')
                    .map_or((part, Direction::Asc), |field| (field, Direction::Desc));
                if field.is_empty() {
                    return Err(FilterError::InvalidSort("empty field name".to_string()));
                }
                Ok(ordering.then(field, direction))
            })
    }

    fn parse_json(raw: &str) -> Result<Self, FilterError> {
        let invalid = |e: serde_json::Error| FilterError::InvalidSort(e.to_string());

        if let Ok(pair) = serde_json::from_str::<Vec<String>>(raw) {
            return Self::from_pairs(std::iter::once(pair));
        }
        let pairs: Vec<Vec<String>> = serde_json::from_str(raw).map_err(invalid)?;
        Self::from_pairs(pairs)
    }

    fn from_pairs(pairs: impl IntoIterator<Item = Vec<String>>) -> Result<Self, FilterError> {
        pairs.into_iter().try_fold(Self::new(), |ordering, pair| match pair.as_slice() {
            [field] => Ok(ordering.asc(field.as_str())),
            [field, direction] => Ok(ordering.then(field.as_str(), Direction::parse(direction)?)),
            _ => Err(FilterError::InvalidSort(
                "expected [\"field\", \"ASC|DESC\"]".to_string(),
            )),
        })
    }
}

impl OrderSource for Ordering {
    fn order(&self) -> Vec<(&str, Direction)> {
        self.0
            .iter()
            .map(|(field, direction)| (field.as_str(), *direction))
            .collect()
    }
}
