// src/analysis/mod.rs

pub mod crossing;
pub mod position_history;
pub mod smoother;
pub mod speed;

pub use crossing::CrossingDetector;
pub use position_history::PositionHistoryStore;
pub use smoother::SpeedSmoother;
