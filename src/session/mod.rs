pub mod defaults;
pub mod editor;
pub mod expansion;
pub mod plans;
pub mod reorder;
pub mod workout;
