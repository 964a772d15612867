#![allow(dead_code)]

pub mod canned_server;
pub mod fakes;
