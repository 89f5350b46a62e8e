pub mod cover_art;
pub mod device_list;
pub mod help_overlay;
pub mod lcd;
