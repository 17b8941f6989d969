use sea_orm::{
    Condition, Value,
    sea_query::{Alias, Expr},
};

use super::{FilterError, FilterValue};

const MAX_IDENTIFIER_LENGTH: usize = 64;

/// A `table.column` reference built from caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedColumn {
    pub table: String,
    pub field: String,
}

impl QualifiedColumn {
    #[must_use]
    pub fn expr(&self) -> Expr {
        Expr::col((
            Alias::new(self.table.as_str()),
            Alias::new(self.field.as_str()),
        ))
    }

    #[must_use]
    pub fn alias_pair(&self) -> (Alias, Alias) {
        (
            Alias::new(self.table.as_str()),
            Alias::new(self.field.as_str()),
        )
    }
}

fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LENGTH
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Resolve a caller-supplied key against the entity.
///
/// `field` must be one of `known_columns` and is qualified with `alias`.
/// `relation.field` is qualified with its own prefix and only checked for
/// identifier safety, since the relation is joined by the caller.
///
/// # Errors
///
/// [`FilterError::InvalidFieldName`] for unsafe identifiers,
/// [`FilterError::UnknownField`] for unqualified names the entity lacks.
pub fn resolve_column(
    key: &str,
    alias: &str,
    known_columns: &[&str],
) -> Result<QualifiedColumn, FilterError> {
    if let Some((relation, field)) = key.split_once('.') {
        if !is_valid_identifier(relation) || !is_valid_identifier(field) {
            return Err(FilterError::InvalidFieldName(key.to_string()));
        }
        return Ok(QualifiedColumn {
            table: relation.to_string(),
            field: field.to_string(),
        });
    }

    if !is_valid_identifier(key) {
        return Err(FilterError::InvalidFieldName(key.to_string()));
    }
    if !known_columns.contains(&key) {
        return Err(FilterError::UnknownField(key.to_string()));
    }
    Ok(QualifiedColumn {
        table: alias.to_string(),
        field: key.to_string(),
    })
}

/// Translate one criterion into a condition on `column`.
///
/// Returns `None` when the criterion constrains nothing (a range with
/// neither bound). All values are bound as parameters.
#[must_use]
pub fn condition_for(column: &QualifiedColumn, value: &FilterValue) -> Option<Condition> {
    let condition = match value {
        FilterValue::Scalar(scalar) => Condition::all().add(column.expr().eq(Value::from(scalar))),
        FilterValue::DateTime(at) => Condition::all().add(column.expr().eq(Value::from(*at))),
        FilterValue::Range { from, to } => {
            if from.is_none() && to.is_none() {
                return None;
            }
            let mut range = Condition::all();
            if let Some(from) = from {
                range = range.add(column.expr().gte(Value::from(from)));
            }
            if let Some(to) = to {
                range = range.add(column.expr().lte(Value::from(to)));
            }
            range
        }
        FilterValue::PartialMatch(text) => {
            Condition::all().add(column.expr().like(format!("%{text}%")))
        }
        FilterValue::Empty => Condition::all().add(column.expr().is_null()),
    };
    Some(condition)
}
