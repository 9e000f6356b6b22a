pub mod money;
pub mod spreadsheet;
pub mod validation;
