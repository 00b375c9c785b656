//! Deferred references: names and type sets seen while loading, bound to
//! concrete capabilities in a separate [ReferenceTable::finalize] pass.
//!
//! A [Ref] is an index into the table, so grants can be built before the
//! catalog is known and compared by identity afterwards.

use std::collections::{BTreeSet, HashMap};

use crate::data::catalog::{normalize_key, CapabilityId, CapabilityRegistry};

/// Object category a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    ShieldProf,
    Equipment,
}

/// Handle into a [ReferenceTable].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref(usize);

/// What a reference denotes. Type lists are deduplicated and sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    AllOf(Category),
    Named {
        category: Category,
        name: String,
    },
    /// Objects carrying `base` and every one of `types`. `base` is implied by
    /// the token and kept apart from the types the data file spelled out.
    Typed {
        category: Category,
        base: String,
        types: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RefKey {
    AllOf(Category),
    Named(Category, String),
    Typed(Category, String, Vec<String>),
}

#[derive(Debug, Clone)]
struct RefEntry {
    target: RefTarget,
    lst_format: String,
    resolved: Option<BTreeSet<CapabilityId>>,
}

/// Interning table for deferred references.
///
/// Indexing methods panic when handed a [Ref] minted by a different table.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    entries: Vec<RefEntry>,
    interned: HashMap<RefKey, Ref>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference to every object of `category`. LST format `ALL`.
    pub fn resolve_all_of(&mut self, category: Category) -> Ref {
        self.intern(RefKey::AllOf(category), || {
            (RefTarget::AllOf(category), "ALL".to_string())
        })
    }

    /// Reference to one object by name. Names are trimmed and case-insensitive;
    /// the first spelling seen is the one written back out.
    pub fn resolve_named(&mut self, category: Category, name: &str) -> Ref {
        let name = name.trim();
        self.intern(RefKey::Named(category, normalize_key(name)), || {
            let target = RefTarget::Named {
                category,
                name: name.to_string(),
            };
            (target, name.to_string())
        })
    }

    /// Reference to every object carrying `base` plus all of the dot-separated
    /// types in `type_expr`. `None` when any type component is empty.
    pub fn resolve_by_type(
        &mut self,
        category: Category,
        base: &str,
        type_expr: &str,
    ) -> Option<Ref> {
        let mut types: Vec<String> = Vec::new();
        for part in type_expr.split('.') {
            if part.is_empty() {
                return None;
            }
            if !types.iter().any(|t| t.eq_ignore_ascii_case(part)) {
                types.push(part.to_string());
            }
        }
        types.sort_by(|a, b| compare_types(a, b));
        let key = RefKey::Typed(
            category,
            base.to_ascii_lowercase(),
            types.iter().map(|t| t.to_ascii_lowercase()).collect(),
        );
        Some(self.intern(key, || {
            let mut all: Vec<&str> = types.iter().map(String::as_str).collect();
            all.push(base);
            all.sort_by(|a, b| compare_types(a, b));
            let lst_format = format!("TYPE={}", all.join("."));
            let target = RefTarget::Typed {
                category,
                base: base.to_string(),
                types,
            };
            (target, lst_format)
        }))
    }

    fn intern<F>(&mut self, key: RefKey, build: F) -> Ref
    where
        F: FnOnce() -> (RefTarget, String),
    {
        if let Some(existing) = self.interned.get(&key) {
            return *existing;
        }
        let (target, lst_format) = build();
        let r = Ref(self.entries.len());
        self.entries.push(RefEntry {
            target,
            lst_format,
            resolved: None,
        });
        self.interned.insert(key, r);
        r
    }

    pub fn target(&self, r: Ref) -> &RefTarget {
        &self.entries[r.0].target
    }

    pub fn lst_format(&self, r: Ref) -> &str {
        &self.entries[r.0].lst_format
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.entries.iter().all(|e| e.resolved.is_some())
    }

    /// Bind every reference to the capabilities it denotes in `registry`.
    ///
    /// Returns the LST format of each named reference the registry cannot
    /// construct. Those resolve to an empty set rather than failing.
    pub fn finalize(&mut self, registry: &CapabilityRegistry) -> Vec<String> {
        let mut unconstructed = Vec::new();
        for entry in &mut self.entries {
            let ids = resolve_target(&entry.target, registry);
            if ids.is_empty() && matches!(entry.target, RefTarget::Named { .. }) {
                unconstructed.push(entry.lst_format.clone());
            }
            entry.resolved = Some(ids);
        }
        unconstructed
    }

    /// Resolved capabilities for `r`; `None` until [Self::finalize] has run.
    pub fn resolved(&self, r: Ref) -> Option<&BTreeSet<CapabilityId>> {
        self.entries[r.0].resolved.as_ref()
    }
}

fn compare_types(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_ascii_lowercase()
        .cmp(&b.to_ascii_lowercase())
        .then_with(|| a.cmp(b))
}

fn resolve_target(target: &RefTarget, registry: &CapabilityRegistry) -> BTreeSet<CapabilityId> {
    match target {
        RefTarget::AllOf(Category::ShieldProf) => registry.ids().collect(),
        RefTarget::AllOf(Category::Equipment) => {
            registry.capabilities_for_types(&[]).into_iter().collect()
        }
        RefTarget::Named {
            category: Category::ShieldProf,
            name,
        } => registry.lookup(name).map(|c| c.id).into_iter().collect(),
        RefTarget::Named {
            category: Category::Equipment,
            name,
        } => registry
            .equipment()
            .iter()
            .filter(|item| item.name.eq_ignore_ascii_case(name.trim()))
            .filter_map(|item| item.proficiency.as_deref())
            .filter_map(|prof| registry.lookup(prof).map(|c| c.id))
            .collect(),
        // Proficiencies carry no types of their own.
        RefTarget::Typed {
            category: Category::ShieldProf,
            ..
        } => BTreeSet::new(),
        RefTarget::Typed {
            category: Category::Equipment,
            base,
            types,
        } => {
            let mut wanted = types.clone();
            wanted.push(base.clone());
            registry.capabilities_for_types(&wanted).into_iter().collect()
        }
    }
}
