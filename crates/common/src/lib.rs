pub mod error;

pub use error::{CampusError, CampusResult};
