pub mod subgraph;
pub mod db_init;
pub mod alert_monitor;

pub mod evaluator;
pub mod dispatcher;
pub mod repository;
pub mod notify;
