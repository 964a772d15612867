//! Core of maphost: hosts a single map web application in an embedded browser
//! surface, rewrites a few of its responses in flight, and routes deep links
//! into navigations or in-page map commands.

pub mod config;
pub mod logging;

pub mod bridge;
pub mod console;
pub mod engine;
pub mod export;
pub mod intercept;
pub mod lifecycle;
pub mod login;
pub mod navigation;
pub mod page;
pub mod router;
pub mod rules;
pub mod session;
