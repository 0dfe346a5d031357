pub mod address_watch;
pub mod command_routing;
pub mod compute_directory;
pub mod instance_lifecycle;
