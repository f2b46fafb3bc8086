pub mod app;
pub mod complete_overlay;
pub mod leaderboard_panel;
pub mod mode_panel;
pub mod puzzle_view;
pub mod registration_overlay;
pub mod retake_button;
pub mod stats_panel;
