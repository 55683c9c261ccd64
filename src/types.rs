/// Shared types used across the codebase

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// HTTP verbs a resource route can be opened to.
/// Used by the configuration allow-list and the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl FromStr for ResourceMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(ResourceMethod::Get),
            "post" => Ok(ResourceMethod::Post),
            "put" => Ok(ResourceMethod::Put),
            "patch" => Ok(ResourceMethod::Patch),
            "delete" => Ok(ResourceMethod::Delete),
            other => Err(format!("unsupported HTTP method '{}'", other)),
        }
    }
}

impl fmt::Display for ResourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceMethod::Get => "GET",
            ResourceMethod::Post => "POST",
            ResourceMethod::Put => "PUT",
            ResourceMethod::Patch => "PATCH",
            ResourceMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = std::collections::BTreeMap<String, Vec<String>>;

/// Source of "now" as Unix epoch milliseconds; swapped for a fixed value in tests.
pub type Clock = fn() -> i64;

pub fn system_clock() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
