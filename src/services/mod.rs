pub mod batch_executor;
pub mod insertion_resolver;
pub mod mutation_planner;
pub mod reporter;
pub mod structure_reader;

pub use batch_executor::BatchExecutor;
pub use insertion_resolver::{InsertionResolver, ResolvedQuestion, Resolution};
pub use mutation_planner::{MutationPlanner, PlannedMutation};
pub use reporter::{FillReport, Reporter};
pub use structure_reader::StructureReader;
