use std::fmt::Display;

use url::form_urlencoded;

/// Ordered query-string builder that drops missing values.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always appended.
    pub fn push(mut self, key: &'static str, value: impl Display) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Appended when the value is present (ids, numbers).
    pub fn opt<T: Display>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Appended when the text is present and non-empty.
    pub fn text(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.push(key, value),
            _ => self,
        }
    }

    /// Appended as `true` only when the flag is set.
    pub fn flag(self, key: &'static str, value: bool) -> Self {
        if value { self.push(key, "true") } else { self }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }

    /// `path?query`, or just `path` when nothing was appended.
    pub fn to_path(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.encode())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_missing_and_empty_values() {
        let query = QueryParams::new()
            .opt("branchId", Some(3))
            .opt::<i64>("customerId", None)
            .text("keyword", Some(""))
            .text("status", None)
            .flag("overdueOnly", false)
            .push("page", 0);
        assert_eq!(query.to_path("/api/debts"), "/api/debts?branchId=3&page=0");
    }

    #[test]
    fn test_encodes_like_url_search_params() {
        let query = QueryParams::new()
            .text("keyword", Some("Nguyễn Văn A & co"))
            .flag("overdueOnly", true);
        assert_eq!(
            query.encode(),
            "keyword=Nguy%E1%BB%85n+V%C4%83n+A+%26+co&overdueOnly=true"
        );
    }

    #[test]
    fn test_no_question_mark_when_empty() {
        assert_eq!(QueryParams::new().to_path("/api/debts/aging"), "/api/debts/aging");
    }
}
