pub mod app;
pub mod config;
pub mod editor;
pub mod history_file;
pub mod logging;
pub mod workflow;

#[cfg(test)]
pub mod test_support;
