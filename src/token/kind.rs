use crate::context::Category;

/// Describes one grant-list token: its name, how type groups are spelled, and
/// which reference categories its segments resolve into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenKind {
    pub parent: &'static str,
    pub name: &'static str,
    /// Accepted type-group prefixes. The last one is the spelling written back out.
    pub type_prefixes: &'static [&'static str],
    /// Type every type-group reference implicitly carries.
    pub type_base: &'static str,
    pub capability: Category,
    pub type_category: Category,
}

/// `AUTO:SHIELDPROF`. `SHIELDTYPE.` is the older spelling of `SHIELDTYPE=`.
pub const SHIELD_PROF: TokenKind = TokenKind {
    parent: "AUTO",
    name: "SHIELDPROF",
    type_prefixes: &["SHIELDTYPE.", "SHIELDTYPE="],
    type_base: "SHIELD",
    capability: Category::ShieldProf,
    type_category: Category::Equipment,
};

impl TokenKind {
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.parent, self.name)
    }

    pub fn canonical_type_prefix(&self) -> &'static str {
        self.type_prefixes.last().copied().unwrap_or("TYPE=")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shield_prof_names_and_prefixes() {
        assert_eq!(SHIELD_PROF.full_name(), "AUTO:SHIELDPROF");
        assert_eq!(SHIELD_PROF.canonical_type_prefix(), "SHIELDTYPE=");
        assert!(SHIELD_PROF
            .type_prefixes
            .iter()
            .all(|p| p.len() == SHIELD_PROF.canonical_type_prefix().len()));
    }
}
