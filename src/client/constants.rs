// Property bag keys shared with the transport
pub const PROPERTY_URI: &str = "uri";
pub const PROPERTY_DESTINATION: &str = "destination";
pub const FTP_PASSIVE_MODE: &str = "ftp-passive-mode";
pub const USER_DIR_IS_ROOT: &str = "user-dir-is-root";
pub const AVOID_PERMISSION_CHECK: &str = "avoid-permission-check";

// Sentinel port meaning "use the protocol's well-known port"
pub const DEFAULT_PORT: i32 = -1;
pub const FTP_DEFAULT_PORT: u16 = 21;
pub const SFTP_DEFAULT_PORT: u16 = 22;

// Buffer related constants
pub const DEFAULT_BUFFER_SIZE: usize = 8192;
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
