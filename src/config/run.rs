//! Options shared by all commands while they run.

/// Default file name for a screen capture.
pub const DEFAULT_CAPTURE_TEMPLATE: &str = "SA_<date>_<time>.png";

/// Default file name for a single exported trace.
pub const DEFAULT_TRACE_TEMPLATE: &str = "SA_<date>_<time>_<trace>.csv";

/// Default file name when several traces are exported together.
pub const DEFAULT_TRACES_TEMPLATE: &str = "SA_<date>_<time>.csv";

/// Output and export settings for a command run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Print read results as JSON instead of text
    pub json: bool,

    /// File name template for a screen capture
    pub capture_template: String,

    /// File name template for a single trace export
    pub trace_template: String,

    /// File name template for a multi-trace export
    pub traces_template: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            json: false,
            capture_template: DEFAULT_CAPTURE_TEMPLATE.to_string(),
            trace_template: DEFAULT_TRACE_TEMPLATE.to_string(),
            traces_template: DEFAULT_TRACES_TEMPLATE.to_string(),
        }
    }
}
