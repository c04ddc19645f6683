/// Column-name constants for carbon-snapshot.
/// Single source of truth - exported to Python via PyO3.

// ── Activity CSV columns ────────────────────────────────────────────────────
pub mod activity {
    pub const ACTIVITY: &str = "activity";
    pub const QUANTITY: &str = "quantity";
    pub const UNIT: &str = "unit";
    /// Accepted in uploads, never read by the calculation.
    pub const DATE: &str = "date";

    pub const REQUIRED: [&str; 3] = [ACTIVITY, QUANTITY, UNIT];
}

// ── Detailed emissions frame ────────────────────────────────────────────────
pub mod detailed {
    pub const ID: &str = "id";
    pub const ACTIVITY: &str = "activity";
    pub const QUANTITY: &str = "quantity";
    pub const UNIT: &str = "unit";
    pub const CATEGORY: &str = "category";
    pub const SCOPE: &str = "scope";
    pub const CO2E: &str = "co2e";
}

// ── Summary frames (by scope / by category) ─────────────────────────────────
pub mod summary {
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
}

// ── Scope labels ────────────────────────────────────────────────────────────
pub mod scope {
    pub const SCOPE_1: &str = "Scope 1: Direct Emissions";
    pub const SCOPE_2: &str = "Scope 2: Indirect Emissions - Purchased Energy";
    pub const SCOPE_3: &str = "Scope 3: Indirect Emissions - Value Chain";
}
