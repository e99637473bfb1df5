//! Puerto serie por hardware.
//!
//! Las condiciones sobre el puerto serie comparan contra la última línea
//! recibida. Esa línea se lee al inicio de cada ciclo de `loop()` y
//! permanece en el búfer hasta que llega otra o hasta que una transición
//! que la lee se dispara.

use std::io::Write;

use crate::{
    codegen::{quote, Context},
    error::Generation,
    model::Brick,
};

/// Búfer global con la última línea recibida.
const INPUT: &str = "serialInput";

pub fn setup<W: Write>(cx: &mut Context<'_, W>, brick: &Brick, baud: u32) -> Generation<()> {
    emit!(cx, "Serial.begin({}); // {} [{}]", baud, brick.name, brick.kind)?;
    Ok(())
}

pub fn print<W: Write>(cx: &mut Context<'_, W>, message: &str) -> Generation<()> {
    emit!(cx, "Serial.println({});", quote(message))?;
    Ok(())
}

pub fn condition(message: &str) -> String {
    format!("{} == {}", INPUT, quote(message))
}

pub fn declare_input<W: Write>(cx: &mut Context<'_, W>) -> Generation<()> {
    emit!(cx, "String {} = \"\";", INPUT)?;
    emit!(cx)?;

    Ok(())
}

/// Lee una línea pendiente, si la hay.
pub fn read_line<W: Write>(cx: &mut Context<'_, W>) -> Generation<()> {
    emit!(cx, "if (Serial.available()) {{")?;
    cx.nested(|cx| {
        emit!(cx, "{} = Serial.readStringUntil('\\n');", INPUT)?;
        emit!(cx, "{}.trim();", INPUT)?;
        Ok(())
    })?;

    emit!(cx, "}}")?;
    Ok(())
}

/// Descarta la línea en el búfer.
pub fn consume<W: Write>(cx: &mut Context<'_, W>) -> Generation<()> {
    emit!(cx, "{} = \"\";", INPUT)?;
    Ok(())
}
