pub mod bar;
pub mod market;
pub mod plan;
pub mod scan;
pub mod signals;
pub mod universe;

pub use bar::*;
pub use market::*;
pub use plan::*;
pub use scan::*;
pub use signals::*;
pub use universe::*;
