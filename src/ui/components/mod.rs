pub mod bottom_nav;
pub mod exercise_card;
pub mod plans_view;
pub mod session_view;
