use std::io::Write;

use quake_core::{Annotation, Earthquake, MapItem, PinColor};
use serde::Serialize;

#[derive(Serialize)]
struct PinRow<'a> {
    #[serde(flatten)]
    earthquake: &'a Earthquake,
    title: String,
    color: PinColor,
    placemark: MapItem,
}

pub fn write_json<W: Write>(out: &mut W, earthquakes: &[Earthquake]) -> anyhow::Result<()> {
    let rows: Vec<PinRow<'_>> = earthquakes
        .iter()
        .map(|earthquake| {
            let pin = Annotation::new(earthquake);
            PinRow {
                earthquake,
                title: pin.title(),
                color: pin.color(),
                placemark: pin.map_item(),
            }
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}

/// One line per pin; `ansi` prefixes each line with a colored swatch.
pub fn write_table<W: Write>(
    out: &mut W,
    earthquakes: &[Earthquake],
    ansi: bool,
) -> anyhow::Result<()> {
    for earthquake in earthquakes {
        let pin = Annotation::new(earthquake);
        let color = pin.color();
        let coord = pin.coordinate();
        if ansi {
            let (r, g, b) = color.rgb();
            write!(out, "\x1b[38;2;{r};{g};{b}m●\x1b[0m ")?;
        }
        writeln!(
            out,
            "{:>8}  {}  {:<10}  {:<7}  {:>8.3},{:>9.3}  {}",
            earthquake.id(),
            earthquake.timestamp().format("%Y-%m-%d %H:%M:%S"),
            pin.title(),
            color,
            coord.latitude,
            coord.longitude,
            pin.subtitle(),
        )?;
    }
    Ok(())
}
