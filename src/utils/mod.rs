//! Utility modules for the editor.

pub mod command;
pub mod editor;
