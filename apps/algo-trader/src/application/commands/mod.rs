//! Command handlers.
//!
//! Each handler takes the ports or strategies it needs plus an output sink,
//! and writes exactly what the command prints on stdout.

mod market;
mod research;
mod trading;

use std::io::Write;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::CommandError;

pub use market::{current, historical, mean, portfolio, test, yesterday};
pub use research::{ArkArgs, ArkMode, ark};
pub use trading::{
    MeanReversionArgs, copycat, mean_reversion, prepare_mean_reversion, simple,
};

/// Write `value` as JSON indented by four spaces, followed by a newline.
pub fn write_pretty_json<W, T>(out: &mut W, value: &T) -> Result<(), CommandError>
where
    W: Write + ?Sized,
    T: Serialize + ?Sized,
{
    let mut ser = Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    writeln!(out)?;
    Ok(())
}
