pub mod db;
pub mod password;
pub mod server;
pub mod telemetry;
