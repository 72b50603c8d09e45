/// Represents the null NetBIOS scope, which also overrides any DHCP-provided scope.
pub const NULL_SCOPE_ID: &str = "*";

/// Represents the accepted scope ID format: `*` or at least two dot-separated DNS labels.
pub const SCOPE_ID_PATTERN: &str =
    r"^(?:\*|[A-Za-z0-9][A-Za-z0-9-]{0,62}(?:\.[A-Za-z0-9][A-Za-z0-9-]{0,62})+)$";

/// Absolute path to PowerShell, used instead of a PATH lookup for privileged commands.
pub const POWERSHELL_EXE: &str = r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe";

/// Arguments passed to PowerShell ahead of the script.
pub const POWERSHELL_ARGS: &[&str] = &["-NoProfile", "-NonInteractive", "-Command"];

/// Item name used in errors and logs for the host-wide settings.
pub const GLOBAL_SETTINGS_ITEM: &str = "global settings";

/// Default environment variable prefix for configuration overrides.
pub const DEFAULT_ENV_PREFIX: &str = "WINS_";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";
