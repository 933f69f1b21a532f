mod fabric_args;
mod id;
mod logging;

pub use fabric_args::FabricArgs;
pub use id::{short_id, suffixed};

pub use tracing;
