// Library surface for the widget core, loaders and remote plumbing.
// The terminal front end in main.rs only renders and feeds input.
pub mod app_dirs;
pub mod assets;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod remote;
pub mod runtime;
pub mod scheduler;
pub mod sector;
pub mod settings;
pub mod sync;
pub mod timers;
pub mod wheel;
pub mod widget;
pub mod winner;
