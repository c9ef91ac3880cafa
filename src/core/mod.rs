pub mod folder;
pub mod matcher;
pub mod resolver;
pub mod stats;
