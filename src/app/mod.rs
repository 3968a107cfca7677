pub mod ports;
pub mod dashboard_use_case;
