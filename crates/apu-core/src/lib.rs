// apu-core - Parameter records and update logic
//
// Everything here is independent of AWS: records are loaded from YAML,
// validated, and applied to anything implementing `ParameterStore`.
// The SSM backend lives in `apu-ssm`.

pub mod error;
pub mod input;
pub mod parameter;
pub mod store;
pub mod update;

// Re-export commonly used types
pub use error::{ErrorCode, ParameterError, Result};
pub use input::{load_parameters, parse_parameters};
pub use parameter::{Parameter, ParameterType, PutRequest, StoredParameter};
pub use store::{MemoryParameterStore, ParameterStore};
pub use update::{RecordResult, UpdateOptions, UpdateOutcome, UpdateReport, Updater};
