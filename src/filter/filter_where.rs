use sqlx::{Postgres, QueryBuilder};

use super::types::ProductFilter;

pub struct FilterWhere;

impl FilterWhere {
    /// Append ` WHERE ...` for `filter` to `builder`, binding every value
    pub fn push(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
        if filter.is_empty() {
            return;
        }

        builder.push(" WHERE ");
        let mut conditions = builder.separated(" AND ");

        if let Some(name) = &filter.name_contains {
            conditions
                .push("\"name\" ILIKE ")
                .push_bind_unseparated(Self::like_pattern(name))
                .push_unseparated(" ESCAPE '\\'");
        }
        if let Some(min) = filter.min_price {
            conditions.push("\"price\" >= ").push_bind_unseparated(min);
        }
        if let Some(max) = filter.max_price {
            conditions.push("\"price\" <= ").push_bind_unseparated(max);
        }
    }

    /// `%needle%` with LIKE metacharacters escaped so the match is literal
    pub fn like_pattern(needle: &str) -> String {
        let mut pattern = String::with_capacity(needle.len() + 2);
        pattern.push('%');
        for c in needle.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(FilterWhere::like_pattern("wid"), "%wid%");
        assert_eq!(FilterWhere::like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn empty_filter_adds_nothing() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM \"products\"");
        FilterWhere::push(&mut builder, &ProductFilter::default());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM \"products\"");
    }

    #[test]
    fn binds_every_condition() {
        let filter = ProductFilter {
            name_contains: Some("wid".into()),
            min_price: Some(1.0),
            max_price: Some(9.0),
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM \"products\"");
        FilterWhere::push(&mut builder, &filter);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM \"products\" WHERE \"name\" ILIKE $1 ESCAPE '\\' AND \"price\" >= $2 AND \"price\" <= $3"
        );
    }
}
