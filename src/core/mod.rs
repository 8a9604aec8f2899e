pub mod add;
pub mod batch;
pub mod calculator;
pub mod config;
pub mod context;
pub mod del;
pub mod edit;
pub mod log;
pub mod rate_limit;
pub mod reassign;
pub mod reminders;
pub mod task;
pub mod week;
pub mod workorder;
