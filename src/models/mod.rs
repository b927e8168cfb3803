pub mod detail;
pub mod directory;
pub mod profile;
pub mod record;
pub mod user;
pub mod wire;
