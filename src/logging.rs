//! Log line format.
//!
//! Every event is written to stdout as one line (multi-line messages, like
//! captured restic output, keep their embedded newlines).  All lines carry
//! the same `INFO:` prefix whatever their level, so warnings and the final
//! failure look like any other progress line:
//!
//! ```text
//! INFO: 2026/10/18 21:04:13 Restic repository found.
//! INFO: 2026/10/18 21:04:15 Restic backup failed: exit status: 1
//! ```
//!
//! The level filter is fixed at `info`; `RUST_LOG` is not consulted.

use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter, format::Writer},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Line prefix shared by every event.
const PREFIX: &str = "INFO: ";

/// `INFO: YYYY/MM/DD HH:MM:SS message`, local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct JobFormat;

impl<S, N> FormatEvent<S, N> for JobFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now();
        write!(writer, "{PREFIX}{} ", now.format("%Y/%m/%d %H:%M:%S"))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber writing to stdout.
pub fn init() {
    subscriber(std::io::stdout).init();
}

fn subscriber<W>(writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(LevelFilter::INFO).with(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .event_format(JobFormat),
    )
}
