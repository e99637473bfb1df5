//! Compilación de máquinas de estados.
//!
//! Cada máquina se emite como una enumeración de estados, una variable con
//! el estado actual y una bandera de entrada. En `loop()` la máquina es un
//! `switch` sobre el estado actual. Las acciones de un estado corren solo
//! en el primer ciclo después de entrar a él; las transiciones se evalúan
//! en todos los ciclos, en orden, y solo la primera que se cumple se
//! dispara.

use log::{debug, trace};
use std::io::Write;

use super::{bricks, expr, Context};
use crate::{
    error::Generation,
    model::{Identifier, State, Transition},
    semantic::MachineRef,
};

/// Nombres en el artefacto para las entidades de una máquina.
///
/// En modo de varias máquinas todo nombre lleva el nombre de la máquina
/// como sufijo, de modo que dos máquinas pueden tener estados homónimos.
pub struct Names {
    suffix: String,
}

impl Names {
    pub fn of(machine: &MachineRef<'_>) -> Self {
        let suffix = match machine.name {
            Some(name) => format!("_{}", name),
            None => String::new(),
        };

        Names { suffix }
    }

    pub fn state_type(&self) -> String {
        format!("STATE{}", self.suffix)
    }

    pub fn state(&self, state: &Identifier) -> String {
        format!("{}{}", state, self.suffix)
    }

    pub fn current(&self) -> String {
        format!("currentState{}", self.suffix)
    }

    pub fn changed(&self) -> String {
        format!("stateChanged{}", self.suffix)
    }

    pub fn last_run(&self) -> String {
        format!("lastRun{}", self.suffix)
    }
}

/// Declara el tipo de estados y las variables de la máquina.
pub fn declare<W: Write>(cx: &mut Context<'_, W>, machine: &MachineRef<'_>) -> Generation<()> {
    let names = Names::of(machine);
    let states = machine
        .states
        .iter()
        .map(|state| names.state(&state.name))
        .collect::<Vec<_>>()
        .join(", ");

    emit!(cx, "enum {} {{{}}};", names.state_type(), states)?;
    emit!(
        cx,
        "{} {} = {};",
        names.state_type(),
        names.current(),
        names.state(machine.initial)
    )?;
    emit!(cx, "bool {} = true;", names.changed())?;

    Ok(())
}

/// Emite el `switch` de la máquina.
pub fn dispatch<W: Write>(cx: &mut Context<'_, W>, machine: &MachineRef<'_>) -> Generation<()> {
    let names = Names::of(machine);
    debug!(
        "Emitting machine `{}` with {} state(s)",
        names.state_type(),
        machine.states.len()
    );

    emit!(cx, "switch ({}) {{", names.current())?;
    cx.nested(|cx| {
        for state in machine.states {
            write_state(cx, &names, state)?;
        }

        Ok(())
    })?;

    emit!(cx, "}}")?;
    Ok(())
}

fn write_state<W: Write>(cx: &mut Context<'_, W>, names: &Names, state: &State) -> Generation<()> {
    trace!(
        "State `{}`: {} action(s), {} transition(s)",
        state.name,
        state.actions.len(),
        state.transitions.len()
    );

    emit!(cx, "case {}:", names.state(&state.name))?;
    cx.nested(|cx| {
        emit!(cx, "if ({}) {{", names.changed())?;
        cx.nested(|cx| {
            emit!(cx, "{} = false;", names.changed())?;
            for action in &state.actions {
                bricks::action(cx, action)?;
            }

            Ok(())
        })?;

        emit!(cx, "}}")?;
        write_transitions(cx, names, &state.transitions)?;
        emit!(cx, "break;")?;

        Ok(())
    })
}

fn write_transitions<W: Write>(
    cx: &mut Context<'_, W>,
    names: &Names,
    transitions: &[Transition],
) -> Generation<()> {
    if transitions.is_empty() {
        return Ok(());
    }

    let program = cx.program();
    let pins = cx.pins();

    for (index, transition) in transitions.iter().enumerate() {
        let guard = expr::guard(&transition.guard, program, pins)?;
        if index == 0 {
            emit!(cx, "if ({}) {{", guard.test)?;
        } else {
            emit!(cx, "}} else if ({}) {{", guard.test)?;
        }

        cx.nested(|cx| {
            for sensor in &guard.debounced {
                emit!(cx, "{} = millis();", bricks::digital::debounce_variable(sensor))?;
            }

            if guard.reads_serial {
                bricks::serial::consume(cx)?;
            }

            // Volver al mismo estado también es una entrada nueva
            emit!(cx, "{} = {};", names.current(), names.state(&transition.next))?;
            emit!(cx, "{} = true;", names.changed())?;

            Ok(())
        })?;
    }

    emit!(cx, "}}")?;
    Ok(())
}
