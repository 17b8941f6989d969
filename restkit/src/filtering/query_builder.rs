use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityName, EntityTrait, IdenStatic, Iterable,
    PaginatorTrait, QueryFilter, QuerySelect, QueryTrait, Select,
    sea_query::{Alias, Expr},
};
use std::marker::PhantomData;

use super::{
    Direction, Filter, FilterError, OrderSource, Pagination, QualifiedColumn, condition_for,
    resolve_column,
};

/// Accumulates filter, pagination and ordering for entity `E`, then yields a
/// Sea-ORM `Select` plus a matching row count.
///
/// Consumes and returns `self` so calls chain with `?`.
#[derive(Debug)]
pub struct QueryBuilder<E: EntityTrait> {
    alias: String,
    condition: Condition,
    offset: Option<u64>,
    limit: Option<u64>,
    order: Vec<(QualifiedColumn, Direction)>,
    entity: PhantomData<E>,
}

impl<E: EntityTrait> Default for QueryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> QueryBuilder<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            alias: Self::table_name(),
            condition: Condition::all(),
            offset: None,
            limit: None,
            order: Vec::new(),
            entity: PhantomData,
        }
    }

    fn table_name() -> String {
        E::default().table_name().to_string()
    }

    fn known_columns() -> Vec<String> {
        E::Column::iter()
            .map(|column| column.as_str().to_string())
            .collect()
    }

    /// The qualifier applied to unqualified field names.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Replace the current conditions with those of `filter`.
    ///
    /// Each field contributes one `AND`ed group. The filter's collection cap
    /// becomes the limit until [`set_pagination`](Self::set_pagination) is called.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] for unknown or unsafe field names.
    pub fn set_filter(mut self, filter: &impl Filter) -> Result<Self, FilterError> {
        self.alias = filter
            .relationship_alias()
            .map_or_else(Self::table_name, str::to_string);
        let owned_columns = Self::known_columns();
        let known_columns: Vec<&str> = owned_columns.iter().map(String::as_str).collect();

        let mut condition = Condition::all();
        for (key, value) in filter.fields() {
            let column = resolve_column(key, &self.alias, &known_columns)?;
            if let Some(field_condition) = condition_for(&column, value) {
                condition = condition.add(field_condition);
            }
        }

        tracing::debug!(
            alias = %self.alias,
            fields = filter.fields().len(),
            max_size = ?filter.collection_max_size(),
            "Applied filter"
        );

        self.condition = condition;
        self.limit = filter.collection_max_size();
        Ok(self)
    }

    #[must_use]
    pub fn set_pagination(mut self, pagination: Pagination) -> Self {
        self.offset = Some(pagination.offset);
        self.limit = Some(pagination.limit);
        self
    }

    /// Append `ORDER BY` clauses in the order the source lists them.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] for unknown or unsafe field names.
    pub fn set_order(mut self, order: &impl OrderSource) -> Result<Self, FilterError> {
        let owned_columns = Self::known_columns();
        let known_columns: Vec<&str> = owned_columns.iter().map(String::as_str).collect();
        for (field, direction) in order.order() {
            let column = resolve_column(field, &self.alias, &known_columns)?;
            self.order.push((column, direction));
        }
        Ok(self)
    }

    /// `SELECT` from the entity table under the current alias, with the
    /// accumulated conditions. No `WHERE` clause when there are none.
    fn filtered(&self) -> Select<E> {
        let mut select = E::find();
        if self.alias != Self::table_name() {
            let alias = Alias::new(self.alias.as_str());
            let columns: Vec<_> = E::Column::iter()
                .map(|column| column.select_as(Expr::col((alias.clone(), column))))
                .collect();
            QueryTrait::query(&mut select)
                .clear_selects()
                .exprs(columns)
                .from_clear()
                .from_as(E::default().table_ref(), alias);
        }
        if self.condition.is_empty() {
            select
        } else {
            select.filter(self.condition.clone())
        }
    }

    /// The fully shaped query: conditions, ordering, offset and limit.
    #[must_use]
    pub fn query(&self) -> Select<E> {
        let mut select = self.filtered();
        for (column, direction) in &self.order {
            QueryTrait::query(&mut select).order_by(column.alias_pair(), (*direction).into());
        }
        select.offset(self.offset).limit(self.limit)
    }

    /// Row count of the filtered query with ordering, offset and limit cleared.
    ///
    /// # Errors
    ///
    /// Propagates the database error.
    pub async fn total_size<C>(&self, db: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
        E::Model: Sync,
    {
        self.filtered().count(db).await
    }
}
