pub mod snapshot;

pub use snapshot::{load_model, save_model, ModelSnapshot};
