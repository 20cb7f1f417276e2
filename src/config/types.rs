//! Verb and allow-list types.

use std::collections::HashSet;
use std::fmt;

/// HTTP verb an allow-list gates. `Get` covers both list and get-by-id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DEFAULT_GET: &[&str] = &[
    "host",
    "guest",
    "party",
    "invite",
    "channel",
    "channel_membership",
    "channel_message",
    "user_device",
];
const DEFAULT_POST: &[&str] = DEFAULT_GET;
const DEFAULT_PUT: &[&str] = &[
    "host",
    "guest",
    "party",
    "invite",
    "channel",
    "channel_membership",
    "user_device",
];
const DEFAULT_DELETE: &[&str] = DEFAULT_PUT;

/// Static per-verb lists of table names eligible for endpoint generation.
/// Names are stored lowercased; lookups lowercase the candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowLists {
    get: HashSet<String>,
    post: HashSet<String>,
    put: HashSet<String>,
    delete: HashSet<String>,
}

impl Default for AllowLists {
    fn default() -> Self {
        AllowLists {
            get: lowered(DEFAULT_GET.iter().copied()),
            post: lowered(DEFAULT_POST.iter().copied()),
            put: lowered(DEFAULT_PUT.iter().copied()),
            delete: lowered(DEFAULT_DELETE.iter().copied()),
        }
    }
}

fn lowered<'a>(names: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    names
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AllowLists {
    /// Empty lists: nothing is exposed until a verb is set.
    pub fn empty() -> Self {
        AllowLists {
            get: HashSet::new(),
            post: HashSet::new(),
            put: HashSet::new(),
            delete: HashSet::new(),
        }
    }

    /// Replace the list for one verb.
    pub fn with<'a>(mut self, verb: Verb, tables: impl IntoIterator<Item = &'a str>) -> Self {
        *self.list_mut(verb) = lowered(tables);
        self
    }

    pub fn allows(&self, verb: Verb, table: &str) -> bool {
        self.list(verb).contains(&table.to_lowercase())
    }

    fn list(&self, verb: Verb) -> &HashSet<String> {
        match verb {
            Verb::Get => &self.get,
            Verb::Post => &self.post,
            Verb::Put => &self.put,
            Verb::Delete => &self.delete,
        }
    }

    fn list_mut(&mut self, verb: Verb) -> &mut HashSet<String> {
        match verb {
            Verb::Get => &mut self.get,
            Verb::Post => &mut self.post,
            Verb::Put => &mut self.put,
            Verb::Delete => &mut self.delete,
        }
    }
}
