//! Widget layout: the declarative screen table and the engine that turns a
//! validated reading into draw commands.

mod command;
mod engine;
pub mod spec;

pub use command::{Align, CommandSink, DrawCommand, Icon, LABEL_LEN, Label, TextSize};
pub use engine::{
    GaugeView, LayoutIssue, LayoutReport, Trend, battery_trend, draw_arc, render_full, render_presence,
    resolve_gauge, resolve_rate,
};
pub use spec::{DASHBOARD, DashboardLayout};
