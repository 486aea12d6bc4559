pub mod admin_controller;
pub mod auth_controller;
pub mod fact_controller;
pub mod health_controller;
pub mod history_controller;
pub mod inference_controller;
pub mod rule_controller;
