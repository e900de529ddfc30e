pub mod cache;
pub mod engine;
pub mod fetch;
pub mod indicators;
pub mod ranking;
pub mod scanner;
pub mod trade_plan;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use engine::{evaluate, score_series, Evaluation};
pub use fetch::{normalize, BatchFetcher, FetchKey};
pub use ranking::{apply_filters, rank};
pub use scanner::Scanner;
pub use trade_plan::{plan_levels, trade_plan, PlanLevels};
