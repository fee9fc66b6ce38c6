/// Field attached to everything this tool creates.
pub const PROVENANCE_KEY: &str = "x-created-by";

/// Value of `PROVENANCE_KEY`; cleanup only touches accounts carrying it.
pub const PROVENANCE_MARKER: &str = "script";
