pub mod achievement;
pub mod task;
pub mod theme;

pub use achievement::Achievement;
pub use task::{Priority, Task};
pub use theme::Theme;
