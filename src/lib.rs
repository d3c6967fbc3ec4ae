pub mod commands;
pub mod logging;
pub mod paths;
pub mod picker;
pub mod profiles;
pub mod settings;
pub mod ssh;
pub mod ssh_config;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
