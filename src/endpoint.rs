/// Request descriptor for a File Station API call
///
/// Holds the API function name and its parameters in the order they are sent.
/// Session parameters (`sid`) and the CGI path are added by the [`crate::client::Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub func: String,
    pub params: Vec<(String, String)>,
}

impl Endpoint {
    #[must_use]
    pub fn new(func: impl Into<String>) -> Self {
        Self {
            func: func.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Looks up the first value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Query pairs: `func` followed by the parameters
    pub(crate) fn query(&self) -> Vec<(&str, &str)> {
        let mut query = Vec::with_capacity(self.params.len() + 1);
        query.push(("func", self.func.as_str()));
        query.extend(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        query
    }
}
