pub mod db;
pub mod media_host;
pub mod staged_file;
