pub mod fragment_view;
pub mod layout;
pub mod status_bar;
