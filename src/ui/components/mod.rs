pub mod practice_form;
pub mod results_pane;
pub mod status_bar;
