// Betting domain logic: the top-3 picker group controller and the
// client-side form validation rules.

pub mod picker;
pub mod validate;

pub use picker::{PickOption, PickerGroup};
