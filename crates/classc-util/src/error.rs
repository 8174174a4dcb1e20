//! Error type for the small number of fallible operations in this crate
//! itself (as opposed to the diagnostic stream the *pipeline* stages
//! produce, which is [`crate::diagnostic::Handler`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UtilError {
    #[error("symbol index {0} out of range")]
    UnknownSymbol(u32),
}
