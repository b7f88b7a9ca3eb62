mod models;
mod reconciler;

pub use models::*;
pub use reconciler::*;
