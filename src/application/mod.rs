// Application layer - Use cases over the upstream API and polled snapshots
pub mod alert_service;
pub mod factory_api;
pub mod history_service;
pub mod machine_service;
pub mod poller;
pub mod session;

#[cfg(test)]
pub mod testing;
