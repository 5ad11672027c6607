pub mod util;

pub use util::{parse_seeds, report_timestamp};
