//! File I/O for the motus pipeline: validated CSV reading with
//! missing-token normalization, and prediction/result writing.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::RunName;
pub use error::IoError;
pub use reader::TableReader;
pub use writer::PredictionWriter;
