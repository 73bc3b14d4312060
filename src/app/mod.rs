mod pipeline;
mod session;

pub use pipeline::Pipeline;
pub use session::{run, SessionEnd};
