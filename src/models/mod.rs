mod tree;
mod lesson;
mod quiz;
mod timeline;
mod catalog;
mod notification;

pub use tree::*;
pub use lesson::*;
pub use quiz::*;
pub use timeline::*;
pub use catalog::*;
pub use notification::*;
