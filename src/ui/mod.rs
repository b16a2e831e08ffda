pub mod components;
pub mod editable_field;
pub mod layout;
pub mod line_input;
pub mod theme;
