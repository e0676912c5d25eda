pub mod state;
pub mod submission;
pub mod view;
