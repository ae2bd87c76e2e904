//! The two callers built on the formatter: an interactive SEL listing and a
//! syslog forwarder. Both only produce lines of text; where they end up is
//! decided by the sink handed to them.

mod display;
pub use display::{DisplayOptions, SelDisplay};

mod syslog;
pub use syslog::{SyslogForwarder, SyslogOptions};

/// The longest text rendered for a single field or message.
pub const OUTPUT_CAPACITY: usize = 4096;
