//! Startup enumeration of exposed (table, verb) pairs.
//!
//! A pair is registered iff the table is in the catalog and its lowercased name is in
//! that verb's allow-list. The result is immutable and logged once so the exposed
//! surface can be audited.

use crate::catalog::Catalog;
use crate::config::{AllowLists, Verb};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub table: String,
    /// Allowed verbs in `Verb::ALL` order. Never empty.
    pub verbs: Vec<Verb>,
}

impl Registration {
    pub fn allows(&self, verb: Verb) -> bool {
        self.verbs.contains(&verb)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTable {
    registrations: Vec<Registration>,
}

impl RouteTable {
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn get(&self, table: &str) -> Option<&Registration> {
        self.registrations.iter().find(|r| r.table == table)
    }

    pub fn is_registered(&self, table: &str, verb: Verb) -> bool {
        self.get(table).map(|r| r.allows(verb)).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// Paths served by the fixed routes.
const RESERVED_PATHS: &[&str] = &["now"];

/// A table name must form a single literal path segment that does not shadow a fixed route.
fn is_routable(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(|c: char| "/:*{}?#".contains(c))
        && !RESERVED_PATHS.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Intersect the catalog with the allow-lists.
pub fn synthesize(catalog: &Catalog, allow: &AllowLists) -> RouteTable {
    let mut registrations = Vec::new();
    for table in &catalog.tables {
        let name = &table.table_name;
        if !is_routable(name) {
            tracing::warn!(table = %name, "table name cannot be used as a path segment, skipping");
            continue;
        }
        tracing::info!(table = %name, "generating REST endpoints");
        let verbs: Vec<Verb> = Verb::ALL.into_iter().filter(|v| allow.allows(*v, name)).collect();
        for verb in &verbs {
            tracing::info!(table = %name, verb = %verb, "registering endpoint");
        }
        if verbs.is_empty() {
            tracing::debug!(table = %name, "not in any allow-list, skipping");
            continue;
        }
        registrations.push(Registration {
            table: name.clone(),
            verbs,
        });
    }
    RouteTable { registrations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnInfo, TableMeta};

    fn catalog(names: &[&str]) -> Catalog {
        Catalog {
            tables: names
                .iter()
                .map(|n| TableMeta {
                    schema_name: "public".into(),
                    table_name: n.to_string(),
                    columns: vec![ColumnInfo::new("id", "int4", "integer")],
                })
                .collect(),
        }
    }

    #[test]
    fn registers_only_catalog_and_allow_list_intersection() {
        let allow = AllowLists::empty()
            .with(Verb::Get, ["guest", "host", "ghost"])
            .with(Verb::Post, ["guest"])
            .with(Verb::Delete, ["host"]);
        let table = synthesize(&catalog(&["guest", "host", "audit"]), &allow);

        assert!(table.is_registered("guest", Verb::Get));
        assert!(table.is_registered("guest", Verb::Post));
        assert!(!table.is_registered("guest", Verb::Put));
        assert!(!table.is_registered("guest", Verb::Delete));
        assert!(table.is_registered("host", Verb::Get));
        assert!(table.is_registered("host", Verb::Delete));
        assert!(!table.is_registered("host", Verb::Post));
        // In an allow-list but not in the schema.
        assert!(table.get("ghost").is_none());
        // In the schema but in no allow-list.
        assert!(table.get("audit").is_none());
        assert_eq!(table.registrations().len(), 2);
    }

    #[test]
    fn catalog_names_match_allow_list_case_insensitively() {
        let allow = AllowLists::empty().with(Verb::Put, ["guest"]);
        let table = synthesize(&catalog(&["Guest"]), &allow);
        assert!(table.is_registered("Guest", Verb::Put));
        assert!(!table.is_registered("guest", Verb::Put));
    }

    #[test]
    fn every_pair_matches_the_invariant() {
        let allow = AllowLists::default();
        let names = ["host", "guest", "party", "channel_message", "pgmigrations", "misc"];
        let cat = catalog(&names);
        let table = synthesize(&cat, &allow);
        for name in names {
            for verb in Verb::ALL {
                assert_eq!(
                    table.is_registered(name, verb),
                    allow.allows(verb, name),
                    "{verb} {name}"
                );
            }
        }
        assert!(!table.is_registered("invite", Verb::Get));
    }

    #[test]
    fn names_that_are_not_plain_segments_are_skipped() {
        let allow = AllowLists::empty().with(Verb::Get, ["now", "a/b", "guest"]);
        let table = synthesize(&catalog(&["now", "a/b", "guest"]), &allow);
        assert!(table.get("now").is_none());
        assert!(table.get("a/b").is_none());
        assert!(table.is_registered("guest", Verb::Get));
    }

    #[test]
    fn empty_catalog_registers_nothing() {
        assert!(synthesize(&Catalog::default(), &AllowLists::default()).is_empty());
    }
}
