//! Charts module - static grouped bar chart rendering

mod renderer;

pub use renderer::{render_change_chart, render_equity_chart};
