mod yaml;
pub use yaml::{WriteError, save, to_yaml, write_atomic};
