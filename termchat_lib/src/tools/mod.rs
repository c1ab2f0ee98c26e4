//! Computer-use tool definitions.

mod group;

pub use group::Display;
pub use group::ToolGroup;
pub use group::ToolSpec;
pub use group::ToolVersion;
