pub mod backups;
pub mod save;
pub mod session;
