/// Length of the truncated object hash used to identify resolved configurations.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Default project file name, looked up in the working directory.
pub const PROJECT_FILENAME: &str = "devmatrix.json";

/// Current project file format version.
pub const PROJECT_VERSION: u32 = 1;

/// Environment variable overriding the platform list (comma separated).
pub const PLATFORMS_ENV: &str = "DEVMATRIX_PLATFORMS";

/// Environment variable holding the log filter directives for the CLI.
pub const LOG_ENV: &str = "DEVMATRIX_LOG";

/// Platforms evaluated when neither the caller nor the project names any.
pub const DEFAULT_PLATFORMS: &[&str] = &["x86_64-linux", "aarch64-linux", "x86_64-darwin", "aarch64-darwin"];

/// Origin recorded for values filled in from declared option defaults.
pub const DEFAULT_ORIGIN: &str = "<default>";
