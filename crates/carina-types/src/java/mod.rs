//! Java-language-specific pieces of the engine: the per-check typing
//! context, supertype instantiation, and the diagnostic type formatter.
//!
//! The formatter is "Java-like" and stable: diagnostics render simple names
//! the way a compiler's messages do, independent of any IDE import context.

pub mod env;
pub mod format;
pub mod helpers;
pub mod overload;
