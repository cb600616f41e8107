mod terminal;
mod ui;

pub use terminal::*;
pub use ui::*;
