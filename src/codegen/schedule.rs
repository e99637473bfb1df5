//! Despacho cooperativo de varias máquinas.
//!
//! Cada máquina lleva la marca de tiempo de su última ejecución y corre un
//! paso cuando transcurrió al menos su periodo. La comparación se hace con
//! resta sin signo, por lo que el desborde del reloj de milisegundos no
//! detiene el despacho.

use log::trace;
use std::io::Write;

use super::{
    bricks,
    machine::{self, Names},
    Context,
};
use crate::{
    error::Generation,
    semantic::{MachineRef, Peripherals},
};

/// Declara la marca de tiempo de una máquina.
pub fn declare<W: Write>(cx: &mut Context<'_, W>, machine: &MachineRef<'_>) -> Generation<()> {
    emit!(cx, "unsigned long {} = 0;", Names::of(machine).last_run())?;
    Ok(())
}

/// Emite el cuerpo de `loop()` en modo de varias máquinas.
pub fn dispatch_all<W: Write>(cx: &mut Context<'_, W>) -> Generation<()> {
    let program = cx.program();

    emit!(cx, "unsigned long currentMillis = millis();")?;
    if program.peripherals().contains(Peripherals::SERIAL_INPUT) {
        bricks::serial::read_line(cx)?;
    }

    for target in program.machines() {
        let names = Names::of(target);
        let period = target.period.unwrap_or_default();

        trace!(
            "Scheduling machine `{}` every {} ms",
            names.state_type(),
            period
        );

        emit!(cx, "if (currentMillis - {} >= {}) {{", names.last_run(), period)?;
        cx.nested(|cx| {
            emit!(cx, "{} = currentMillis;", names.last_run())?;
            machine::dispatch(cx, target)
        })?;

        emit!(cx, "}}")?;
    }

    Ok(())
}

/// Si una máquina debe correr un paso en el instante `now`.
///
/// Reproduce la aritmética del firmware: la diferencia se calcula módulo
/// 2³², así que una marca previa al desborde sigue siendo válida.
pub fn is_due(last_run: u32, now: u32, period: u32) -> bool {
    now.wrapping_sub(last_run) >= period
}
