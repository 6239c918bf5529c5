//! Domain model (IDs, specs, records, statuses, the driver contract).

pub mod attempt;
pub mod driver;
pub mod ids;
pub mod outcome;
pub mod spec;
pub mod status;

pub use attempt::{AttemptCounts, AttemptRecord, ResultLog};
pub use driver::{Driver, DriverReport, DriverWork, WorkReport};
pub use ids::{AttemptId, RunId};
pub use outcome::{Rejection, RunOutcome, RunValue};
pub use spec::DriverSpec;
pub use status::TaskStatus;
