// TUI widget modules for each panel and form control.

pub mod alert;
pub mod bets_table;
pub mod payment;
pub mod picker;
pub mod status_bar;
pub mod text_field;
