//! Rendering backends.
//!
//! The kernel describes every visible change as a [`LayerCommand`]; a backend
//! owns the actual map, panel and chart widgets and applies commands in order.

use crate::kernel::LayerCommand;

pub trait MapBackend {
    fn apply(&mut self, command: LayerCommand);

    fn apply_all(&mut self, commands: Vec<LayerCommand>) {
        for command in commands {
            self.apply(command);
        }
    }
}

pub mod console;
