//! Log line formatting with the scene's tick number.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Tick of the most recently advanced scene.
static SCENE_TICK: AtomicU64 = AtomicU64::new(0);

/// Only the low 16 bits are printed.
const TICK_DISPLAY_MASK: u64 = 0xFFFF;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:4]");

/// Formats events as `time tick level spans target: fields`.
///
/// ```text
/// 12:04:31.0921 0x01A4  INFO drive_fast::systems::session: Game over reason=Crash score=212
/// ```
pub struct SceneFormatter;

impl<S, N> FormatEvent<S, N> for SceneFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        dimmed(&mut writer, ansi, format_args!("{timestamp} 0x{:04X}", tick_count() & TICK_DISPLAY_MASK))?;
        writer.write_char(' ')?;

        level(&mut writer, ansi, meta.level())?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.metadata().name())?;
                if let Some(fields) = span.extensions().get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                writer.write_char(':')?;
            }
            writer.write_char(' ')?;
        }

        dimmed(&mut writer, ansi, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level(writer: &mut Writer<'_>, ansi: bool, level: &Level) -> fmt::Result {
    let (color, text) = match *level {
        Level::TRACE => ("35", "TRACE"),
        Level::DEBUG => ("34", "DEBUG"),
        Level::INFO => ("32", " INFO"),
        Level::WARN => ("33", " WARN"),
        Level::ERROR => ("31", "ERROR"),
    };

    if ansi {
        write!(writer, "\x1b[{color}m{text}\x1b[0m")
    } else {
        writer.write_str(text)
    }
}

fn dimmed(writer: &mut Writer<'_>, ansi: bool, text: fmt::Arguments<'_>) -> fmt::Result {
    if ansi {
        write!(writer, "\x1b[2m{text}\x1b[0m")
    } else {
        writer.write_fmt(text)
    }
}

/// Records the tick the scene is about to run, so log lines can be correlated with it.
pub fn set_tick_count(tick: u64) {
    SCENE_TICK.store(tick, Ordering::Relaxed);
}

pub fn tick_count() -> u64 {
    SCENE_TICK.load(Ordering::Relaxed)
}
