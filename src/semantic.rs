//! Resolución de referencias.
//!
//! El modelo llega ya validado por el front end, pero el núcleo no genera
//! código a partir de referencias colgantes. Esta fase verifica el modo de
//! máquinas, construye la tabla de símbolos de bricks y comprueba que cada
//! acción, condición y transición apunte a una entidad existente y de la
//! categoría correcta. Se reportan todos los errores encontrados a la vez,
//! excepto conflictos de modo, que abortan de inmediato.

use bitflags::bitflags;
use log::debug;
use std::collections::HashMap;

use crate::{
    codegen::{bricks::buzzer, machine::Names},
    error::{Conflict, GenerationError, Reference},
    model::{
        Action, AnalogValue, App, Brick, BrickKind, Condition, Expression, Identifier, Machine,
        Pitch, Segment, State,
    },
};

pub type Semantic<T> = Result<T, Vec<GenerationError>>;

bitflags! {
    /// Periféricos y capacidades que el programa necesita.
    pub struct Peripherals: u32 {
        /// Existe un LCD.
        const LCD = 0x01;

        /// Existe un puerto serie.
        const SERIAL = 0x02;

        /// Existe al menos un sensor de temperatura.
        const TEMPERATURE = 0x04;

        /// Alguna transición lee líneas del puerto serie.
        const SERIAL_INPUT = 0x08;
    }
}

/// Modo de máquinas de la aplicación.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Una sola máquina implícita.
    Single,

    /// Varias máquinas con despacho por tiempo.
    Multi,
}

/// Vista prestada de una máquina, sin importar el modo.
#[derive(Copy, Clone, Debug)]
pub struct MachineRef<'a> {
    /// `None` para la máquina implícita del modo heredado.
    pub name: Option<&'a Identifier>,
    pub initial: &'a Identifier,
    pub states: &'a [State],
    pub period: Option<u32>,
}

impl<'a> MachineRef<'a> {
    pub fn state(&self, name: &Identifier) -> Option<&'a State> {
        self.states.iter().find(|state| &state.name == name)
    }
}

/// Programa resuelto, listo para asignación de pines y emisión.
pub struct Program<'a> {
    app: &'a App,
    mode: Mode,
    machines: Vec<MachineRef<'a>>,
    peripherals: Peripherals,
    symbols: SymbolTable<'a>,
}

impl<'a> Program<'a> {
    pub fn app(&self) -> &'a App {
        self.app
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn machines(&self) -> &[MachineRef<'a>] {
        &self.machines
    }

    pub fn peripherals(&self) -> Peripherals {
        self.peripherals
    }

    /// Busca un brick por nombre.
    pub fn brick(&self, name: &Identifier) -> Result<&'a Brick, GenerationError> {
        self.symbols.lookup(name)
    }
}

struct SymbolTable<'a> {
    symbols: HashMap<&'a Identifier, &'a Brick>,
}

impl<'a> SymbolTable<'a> {
    fn lookup(&self, name: &Identifier) -> Result<&'a Brick, GenerationError> {
        self.symbols.get(name).copied().ok_or_else(|| {
            GenerationError::UnresolvedReference(Reference::Brick(name.clone()))
        })
    }
}

impl App {
    /// Resuelve el modelo completo.
    pub fn resolve(&self) -> Semantic<Program<'_>> {
        let mode = self.mode().map_err(|conflict| vec![conflict])?;
        let machines = self.machine_refs(mode).map_err(|conflict| vec![conflict])?;

        let mut errors = Vec::new();
        let symbols = self.scan_bricks(&mut errors);
        let peripherals = self.scan_peripherals(&mut errors);

        let mut context = Context {
            symbols: &symbols,
            errors: &mut errors,
            serial_input: false,
        };

        context.scan_machines(&machines);
        let serial_input = context.serial_input;

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut peripherals = peripherals;
        peripherals.set(Peripherals::SERIAL_INPUT, serial_input);

        debug!(
            "Resolved `{}`: {:?} mode, {} machine(s), {:?}",
            self.name,
            mode,
            machines.len(),
            peripherals
        );

        Ok(Program {
            app: self,
            mode,
            machines,
            peripherals,
            symbols,
        })
    }

    fn mode(&self) -> Result<Mode, GenerationError> {
        // Un `initial` suelto también pertenece a la máquina implícita
        let single = !self.states.is_empty() || self.initial.is_some();
        let multiple = !self.machines.is_empty();

        match (single, multiple) {
            (true, false) => Ok(Mode::Single),
            (false, true) => Ok(Mode::Multi),
            (true, true) => Err(GenerationError::ConfigurationConflict(Conflict::Both)),
            (false, false) => Err(GenerationError::ConfigurationConflict(Conflict::Neither)),
        }
    }

    fn machine_refs(&self, mode: Mode) -> Result<Vec<MachineRef<'_>>, GenerationError> {
        match mode {
            Mode::Single => {
                let initial = self.initial.as_ref().ok_or(
                    GenerationError::UnresolvedReference(Reference::NoInitialState),
                )?;

                Ok(vec![MachineRef {
                    name: None,
                    initial,
                    states: &self.states,
                    period: None,
                }])
            }

            Mode::Multi => self
                .machines
                .iter()
                .map(|machine: &Machine| {
                    let period = machine.period.ok_or_else(|| {
                        GenerationError::ConfigurationConflict(Conflict::MissingPeriod(
                            machine.name.clone(),
                        ))
                    })?;

                    Ok(MachineRef {
                        name: Some(&machine.name),
                        initial: &machine.initial,
                        states: &machine.states,
                        period: Some(period),
                    })
                })
                .collect(),
        }
    }

    fn scan_bricks(&self, errors: &mut Vec<GenerationError>) -> SymbolTable<'_> {
        let mut symbols = HashMap::new();
        for brick in &self.bricks {
            if symbols.insert(&brick.name, brick).is_some() {
                errors.push(GenerationError::DuplicateName(brick.name.clone()));
            }
        }

        SymbolTable { symbols }
    }

    fn scan_peripherals(&self, errors: &mut Vec<GenerationError>) -> Peripherals {
        let mut peripherals = Peripherals::empty();
        let mut serial: Option<&Identifier> = None;
        let mut lcd: Option<&Identifier> = None;

        for brick in &self.bricks {
            let (flag, seen, kind) = match brick.kind {
                BrickKind::SerialLine { .. } => (Peripherals::SERIAL, &mut serial, "serial line"),
                BrickKind::LcdDisplay => (Peripherals::LCD, &mut lcd, "LCD"),
                BrickKind::TemperatureSensor => {
                    peripherals |= Peripherals::TEMPERATURE;
                    continue;
                }

                _ => continue,
            };

            match *seen {
                Some(first) => errors.push(GenerationError::DuplicatePeripheral {
                    kind,
                    first: first.clone(),
                    second: brick.name.clone(),
                }),

                None => *seen = Some(&brick.name),
            }

            peripherals |= flag;
        }

        peripherals
    }
}

struct Context<'b, 'a: 'b> {
    symbols: &'b SymbolTable<'a>,
    errors: &'b mut Vec<GenerationError>,
    serial_input: bool,
}

const DIGITAL_READABLE: &[BrickKind] = &[
    BrickKind::DigitalSensor,
    BrickKind::DigitalActuator,
    BrickKind::Buzzer,
];

const ANALOG_READABLE: &[BrickKind] = &[BrickKind::AnalogSensor, BrickKind::TemperatureSensor];

const DIGITAL_WRITABLE: &[BrickKind] = &[BrickKind::DigitalActuator, BrickKind::Buzzer];

impl Context<'_, '_> {
    fn scan_machines(&mut self, machines: &[MachineRef<'_>]) {
        let mut machine_names = HashMap::new();
        let mut constants = HashMap::new();

        for machine in machines {
            if let Some(name) = machine.name {
                if machine_names.insert(name, ()).is_some() {
                    self.errors.push(GenerationError::DuplicateName(name.clone()));
                }
            }

            let names = Names::of(machine);
            let mut state_names = HashMap::new();
            for state in machine.states {
                if state_names.insert(&state.name, ()).is_some() {
                    self.errors
                        .push(GenerationError::DuplicateName(state.name.clone()));
                } else if machine.name.is_some() {
                    // Los enumeradores comparten un solo espacio de nombres global
                    let constant = names.state(&state.name);
                    if constants.insert(constant.clone(), ()).is_some() {
                        self.errors
                            .push(GenerationError::DuplicateName(Identifier::new(constant)));
                    }
                }
            }

            if machine.state(machine.initial).is_none() {
                self.unresolved_state(machine, machine.initial);
            }

            for state in machine.states {
                for action in &state.actions {
                    self.scan_action(action);
                }

                for transition in &state.transitions {
                    self.scan_expression(&transition.guard);
                    if machine.state(&transition.next).is_none() {
                        self.unresolved_state(machine, &transition.next);
                    }
                }
            }
        }
    }

    fn scan_action(&mut self, action: &Action) {
        match action {
            Action::DigitalWrite { actuator, .. } => {
                self.expect(actuator, DIGITAL_WRITABLE, "a digital actuator");
            }

            Action::AnalogWrite { actuator, value } => {
                self.expect(actuator, &[BrickKind::AnalogActuator], "an analog actuator");
                if let AnalogValue::Sensor(sensor) = value {
                    self.expect(sensor, ANALOG_READABLE, "an analog sensor");
                }
            }

            Action::SerialPrint { serial, .. } => {
                self.expect_serial(serial);
            }

            Action::LcdUpdate { display, segments } => {
                self.expect(display, &[BrickKind::LcdDisplay], "an LCD");
                for segment in segments {
                    if let Segment::Status(brick) = segment {
                        self.expect(
                            brick,
                            &[
                                BrickKind::DigitalSensor,
                                BrickKind::DigitalActuator,
                                BrickKind::Buzzer,
                                BrickKind::AnalogSensor,
                                BrickKind::TemperatureSensor,
                            ],
                            "a brick with a readable status",
                        );
                    }
                }
            }

            Action::Tone { buzzer, pitch, .. } => {
                self.expect(buzzer, &[BrickKind::Buzzer], "a buzzer");
                if let Pitch::Note(note) = pitch {
                    if let Err(error) = buzzer::note_frequency(note) {
                        self.errors.push(error);
                    }
                }
            }

            Action::Silence { buzzer } => {
                self.expect(buzzer, &[BrickKind::Buzzer], "a buzzer");
            }
        }
    }

    fn scan_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Binary { left, right, .. } => {
                self.scan_expression(left);
                self.scan_expression(right);
            }

            Expression::Condition(Condition::Digital { brick, .. }) => {
                self.expect(brick, DIGITAL_READABLE, "a digital brick");
            }

            Expression::Condition(Condition::Analog { brick, .. }) => {
                self.expect(brick, ANALOG_READABLE, "an analog sensor");
            }

            Expression::Condition(Condition::Serial { brick, .. }) => {
                self.serial_input = true;
                self.expect_serial(brick);
            }
        }
    }

    fn expect_serial(&mut self, brick: &Identifier) {
        match self.symbols.lookup(brick) {
            Ok(Brick {
                kind: BrickKind::SerialLine { .. },
                ..
            }) => (),

            Ok(other) => self.errors.push(GenerationError::WrongCategory {
                brick: brick.clone(),
                expected: "a serial line",
                found: other.kind,
            }),

            Err(error) => self.errors.push(error),
        }
    }

    fn expect(&mut self, brick: &Identifier, allowed: &[BrickKind], expected: &'static str) {
        match self.symbols.lookup(brick) {
            Ok(found) if allowed.contains(&found.kind) => (),

            Ok(found) => self.errors.push(GenerationError::WrongCategory {
                brick: brick.clone(),
                expected,
                found: found.kind,
            }),

            Err(error) => self.errors.push(error),
        }
    }

    fn unresolved_state(&mut self, machine: &MachineRef<'_>, state: &Identifier) {
        self.errors
            .push(GenerationError::UnresolvedReference(Reference::State {
                machine: machine.name.cloned(),
                state: state.clone(),
            }));
    }
}
