mod client;
mod naming;
mod types;

pub use client::JenkinsClient;
pub use naming::release_version;
