pub mod undo_stack;
pub use undo_stack::*;
