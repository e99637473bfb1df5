//! Pantalla LCD de caracteres.
//!
//! El LCD usa la biblioteca `LiquidCrystal` sobre un cableado fijo que el
//! asignador de pines reserva antes de repartir los pools.

use std::io::Write;

use crate::{
    codegen::{quote, Context},
    error::Generation,
    model::{Brick, Segment},
};

pub fn declare<W: Write>(cx: &mut Context<'_, W>) -> Generation<()> {
    let wiring = cx
        .options()
        .board
        .lcd_wiring()
        .iter()
        .map(|pin| pin.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    emit!(cx, "#include <LiquidCrystal.h>")?;
    emit!(cx)?;
    emit!(cx, "LiquidCrystal lcd({});", wiring)?;
    emit!(cx)?;

    Ok(())
}

pub fn setup<W: Write>(cx: &mut Context<'_, W>, brick: &Brick) -> Generation<()> {
    let (columns, rows) = cx.options().board.lcd_geometry();
    emit!(cx, "lcd.begin({}, {}); // {} [{}]", columns, rows, brick.name, brick.kind)?;

    Ok(())
}

/// Limpia la pantalla y escribe los segmentos en orden.
pub fn update<W: Write>(cx: &mut Context<'_, W>, segments: &[Segment]) -> Generation<()> {
    emit!(cx, "lcd.clear();")?;
    emit!(cx, "lcd.setCursor(0, 0);")?;

    for segment in segments {
        let printed = match segment {
            Segment::Text(text) => quote(text),
            Segment::Status(brick) => super::status(brick, cx.program(), cx.pins())?,
        };

        emit!(cx, "lcd.print({});", printed)?;
    }

    Ok(())
}
