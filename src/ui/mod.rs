//! Rendering side. The kernel describes map changes as layer commands; a
//! backend executes them.

pub mod backend;
