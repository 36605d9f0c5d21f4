//! Default configuration values

use std::time::Duration;

/// Default external builder executable
pub const DEFAULT_BUILDER: &str = "osbuild";

/// Monitor format requested from the builder on the live path
pub const MONITOR_FORMAT: &str = "JSONSeqMonitor";

/// File descriptor number the builder writes status records to
pub const MONITOR_FD: i32 = 3;

/// Default object store directory handed to the builder
pub const DEFAULT_STORE: &str = "/store";

/// Default output directory for build artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "/output";

/// Default image type when none is requested
pub const DEFAULT_IMAGE_TYPE: &str = "qcow2";

/// Default progress backend
pub const DEFAULT_PROGRESS: &str = "plain";

/// Redraw period of the terminal progress display
pub const RENDER_INTERVAL: Duration = Duration::from_millis(200);

/// How long `stop()` waits for the redraw task to acknowledge
pub const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Pulse and status messages longer than this are elided
pub const MAX_MESSAGE_LEN: usize = 60;

/// Width of the bar drawn for each sub-progress level
pub const BAR_WIDTH: usize = 30;
