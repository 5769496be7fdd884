pub mod filter;
pub mod path_builder;
pub mod record;

pub use filter::FilterSnapshot;
pub use path_builder::{build_paths, MigrationPath, PathSet};
pub use record::{load_migration_csv, read_migration_csv, FlowRecord};

/// Which side of the selected region a flow sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowCategory {
    /// No region selected
    Normal,
    Inflow,
    Outflow,
}

impl FlowCategory {
    /// Draw order; later batches paint over earlier ones.
    pub const DRAW_ORDER: [FlowCategory; 3] =
        [FlowCategory::Normal, FlowCategory::Inflow, FlowCategory::Outflow];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowCategory::Normal => "normal",
            FlowCategory::Inflow => "inflow",
            FlowCategory::Outflow => "outflow",
        }
    }
}
