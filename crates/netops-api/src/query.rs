// Query builder for PostgREST-style table endpoints.
//
// Filters render as `column=op.value` query parameters; embedded relations
// ride along in the `select` parameter (e.g. `*,sites(name,code)`).

use std::fmt;

/// Sort direction for an `order` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Filter, projection, ordering, and limit for a single table request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<(String, Order)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column projection, including embedded relations.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// `column = value`
    pub fn eq(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "eq", value)
    }

    /// `column >= value`
    pub fn gte(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "gte", value)
    }

    /// `column < value`
    pub fn lt(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "lt", value)
    }

    /// Set membership: `column IN (a, b, ...)`.
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        let list = values
            .into_iter()
            .map(|v| quote_list_item(&v.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({list})"))
    }

    pub fn order(mut self, column: impl Into<String>, direction: Order) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether any row-narrowing filter is present.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Render as query-string pairs, in a stable order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);
        if let Some(ref select) = self.select {
            params.push(("select".to_owned(), select.clone()));
        }
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(col, dir)| format!("{col}.{}", dir.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_owned(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }
        params
    }

    fn filter(mut self, column: &str, op: &str, value: impl fmt::Display) -> Self {
        self.filters.push((column.to_owned(), format!("{op}.{value}")));
        self
    }
}

/// Reserved characters inside an `in.(...)` list require double quoting.
fn quote_list_item(raw: &str) -> String {
    if raw.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pairs(q: &Query) -> Vec<(String, String)> {
        q.to_params()
    }

    #[test]
    fn renders_select_filters_order_limit() {
        let q = Query::new()
            .select("*,sites(name,code)")
            .eq("status", "active")
            .order("created_at", Order::Desc)
            .limit(5);

        assert_eq!(
            pairs(&q),
            vec![
                ("select".into(), "*,sites(name,code)".into()),
                ("status".into(), "eq.active".into()),
                ("order".into(), "created_at.desc".into()),
                ("limit".into(), "5".into()),
            ]
        );
    }

    #[test]
    fn in_list_quotes_reserved_characters() {
        let q = Query::new().in_list("status", ["open", "in progress", "a,b"]);
        assert_eq!(
            pairs(&q),
            vec![("status".into(), r#"in.(open,"in progress","a,b")"#.into())]
        );
    }

    #[test]
    fn multiple_order_columns_join_with_commas() {
        let q = Query::new()
            .order("severity", Order::Desc)
            .order("created_at", Order::Asc);
        assert_eq!(
            pairs(&q),
            vec![("order".into(), "severity.desc,created_at.asc".into())]
        );
    }

    #[test]
    fn empty_query_has_no_params() {
        let q = Query::new();
        assert!(q.to_params().is_empty());
        assert!(!q.has_filters());
    }
}
