pub mod id;
pub mod model;
pub mod scene;
pub mod serialize;
pub mod snapshot;

pub use id::ObjectId;
pub use model::*;
pub use scene::Scene;
pub use serialize::{DocumentError, FORMAT_VERSION, export_json, import_json};
pub use snapshot::Snapshot;
