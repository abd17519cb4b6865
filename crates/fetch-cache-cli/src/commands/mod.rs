pub mod fetch;
pub mod format;
pub mod load;
pub mod path;
pub mod status;
