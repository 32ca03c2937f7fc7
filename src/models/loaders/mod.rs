pub mod json_loader;
pub mod toml_loader;

pub use json_loader::load_answers_file;
pub use toml_loader::load_format_config;
