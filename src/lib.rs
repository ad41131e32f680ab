//! portiere: authentication service for the property management platform.

pub mod api;
pub mod auth;
pub mod cli;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Git commit the binary was built from; empty outside a git checkout.
pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "",
};
