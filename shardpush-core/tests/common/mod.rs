pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{Workspace, write_file};
#[allow(unused_imports)]
pub use mocks::{ScriptedSpace, ScriptedUploader};
