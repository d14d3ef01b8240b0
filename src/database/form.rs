use std::{collections::HashMap, str::FromStr};

use serde_json::Value;

use super::{error::TypeError, schema::Id};

/// Loosely typed request data: a JSON object body or a decoded query string.
pub type FormData = HashMap<String, Value>;

pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    /// Missing keys are `None`; present keys must hold a string.
    pub fn get_optional_str(&self, key: &str) -> Result<Option<String>, TypeError> {
        match self.inner.get(key) {
            Some(value) => match value.as_str() {
                Some(v) => Ok(Some(v.to_string())),
                None => Err(TypeError::new(&format!("{key} must be a string"))),
            },
            None => Ok(None),
        }
    }

    /// Parses a string value, as query parameters always arrive as strings.
    pub fn get_optional_number<T>(&self, key: &str) -> Result<Option<T>, TypeError>
    where
        T: FromStr,
    {
        match self.get_optional_str(key)? {
            Some(v) => v
                .trim()
                .parse()
                .map(Some)
                .map_err(|_e| TypeError::new(&format!("{key} must be a number"))),
            None => Ok(None),
        }
    }

    /// `?key=1` is true, `?key=0` or a missing key is false.
    pub fn get_flag(&self, key: &str) -> Result<bool, TypeError> {
        Ok(self.get_optional_number::<i64>(key)?.unwrap_or(0) != 0)
    }

    /// A comma separated id list such as `?tags=1,2,3`.
    pub fn get_id_list(&self, key: &str) -> Result<Vec<Id>, TypeError> {
        match self.get_optional_str(key)? {
            Some(v) if !v.trim().is_empty() => v
                .split(',')
                .map(|id| {
                    id.trim()
                        .parse::<Id>()
                        .map_err(|_e| TypeError::new(&format!("{key} must be a list of ids")))
                })
                .collect(),
            _ => Ok(vec![]),
        }
    }
}
