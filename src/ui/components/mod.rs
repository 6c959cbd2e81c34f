pub mod diff_view;
pub mod metric_panel;
pub mod results;
