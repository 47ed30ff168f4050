pub mod color;
pub mod transition;
