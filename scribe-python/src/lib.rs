//! Python source generation on top of [`scribe_core`].
//!
//! [`PythonModule`] adds keyword-shaped helpers (`def_`, `if_`, `class_`,
//! ...) to a core [`Module`](scribe_core::Module), plus import statements that
//! keep collecting names until render time and calls that wrap when they get
//! too wide.

mod call;
mod imports;
mod module;

pub use call::Caller;
pub use imports::FromImport;
pub use module::PythonModule;
