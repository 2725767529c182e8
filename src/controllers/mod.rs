pub mod home_controller;
pub mod tokens_controller;
pub mod alerts_controller;
