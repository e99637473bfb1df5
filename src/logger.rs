//! Configuración de bitácora.

use env_logger::Builder;
use log::{trace, LevelFilter};
use std::io::Write;
use time::OffsetDateTime;

/// Configura la bitácora con la verbosidad indicada.
///
/// Cada nivel adicional habilita mensajes más detallados, hasta `trace`.
pub fn configure(verbosity: u8) -> Result<(), String> {
    let level = filter(verbosity)?;
    trace!("Logger verbosity {}", level);

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{} {}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                OffsetDateTime::now_utc(),
                record.args()
            )
        })
        .filter_level(level)
        .try_init()
        .map_err(|error| error.to_string())
}

fn filter(verbosity: u8) -> Result<LevelFilter, String> {
    match verbosity {
        0 => Ok(LevelFilter::Error),
        1 => Ok(LevelFilter::Warn),
        2 => Ok(LevelFilter::Info),
        3 => Ok(LevelFilter::Debug),
        4 => Ok(LevelFilter::Trace),
        _ => Err(String::from("At most four levels of verbosity (-vvvv)")),
    }
}
