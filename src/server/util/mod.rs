//! Small parsing and formatting helpers shared by configuration and the poller.

pub mod parse;
