pub mod api;
pub mod config;
pub mod dashboard;
pub mod login;
pub mod moderation;
pub mod partylist;
pub mod poller;
pub mod session;
