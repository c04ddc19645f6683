//! Ordered emission-factor resolution.
//!
//! Each resolver gets the normalized (trimmed, lowercased) activity name and
//! either claims it or passes. The chain is evaluated in order and the first
//! match wins.

use crate::factors::{EmissionFactor, EmissionFactorTable};

/// Which rule produced a factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Category,
    Default,
}

pub trait FactorResolver: Send + Sync {
    fn kind(&self) -> MatchKind;

    fn resolve<'t>(
        &self,
        activity: &str,
        table: &'t EmissionFactorTable,
    ) -> Option<&'t EmissionFactor>;
}

/// Activity name equals a table key.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatch;

impl FactorResolver for ExactMatch {
    fn kind(&self) -> MatchKind {
        MatchKind::Exact
    }

    fn resolve<'t>(
        &self,
        activity: &str,
        table: &'t EmissionFactorTable,
    ) -> Option<&'t EmissionFactor> {
        table.get(activity)
    }
}

/// First entry (table order) whose lowercased category occurs in the activity.
///
/// Matches on category text, not activity meaning: "team travel lunch" hits
/// the first Travel entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct CategorySubstring;

impl FactorResolver for CategorySubstring {
    fn kind(&self) -> MatchKind {
        MatchKind::Category
    }

    fn resolve<'t>(
        &self,
        activity: &str,
        table: &'t EmissionFactorTable,
    ) -> Option<&'t EmissionFactor> {
        table
            .entries()
            .map(|(_, factor)| factor)
            .find(|factor| activity.contains(&factor.category.to_lowercase()))
    }
}

/// Always answers with the table's default entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFallback;

impl FactorResolver for DefaultFallback {
    fn kind(&self) -> MatchKind {
        MatchKind::Default
    }

    fn resolve<'t>(
        &self,
        _activity: &str,
        table: &'t EmissionFactorTable,
    ) -> Option<&'t EmissionFactor> {
        Some(table.default_factor())
    }
}

pub struct ResolverChain {
    resolvers: Vec<Box<dyn FactorResolver>>,
}

impl ResolverChain {
    pub fn new(resolvers: Vec<Box<dyn FactorResolver>>) -> Self {
        Self { resolvers }
    }

    /// exact → category substring → default
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ExactMatch),
            Box::new(CategorySubstring),
            Box::new(DefaultFallback),
        ])
    }

    /// Walk the chain. Falls back to the table default if no resolver claims
    /// the activity, so a chain without `DefaultFallback` still resolves.
    pub fn resolve<'t>(
        &self,
        activity: &str,
        table: &'t EmissionFactorTable,
    ) -> (&'t EmissionFactor, MatchKind) {
        self.resolvers
            .iter()
            .find_map(|r| r.resolve(activity, table).map(|f| (f, r.kind())))
            .unwrap_or((table.default_factor(), MatchKind::Default))
    }
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.kind()))
            .finish()
    }
}
