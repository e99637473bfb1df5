//! Asignación de pines.
//!
//! La asignación ocurre en tres pasadas sobre la lista de bricks:
//!
//! 1. Pines manuales: se registran tal cual y se retiran de todo pool
//!    en el que aparezcan.
//! 2. Reservas: si hay un LCD, su cableado fijo se retira de todos los
//!    pools. El LCD mismo no consume un espacio de pool, y tampoco lo
//!    hace el puerto serie.
//! 3. Asignación automática: en orden de declaración, cada brick sin pin
//!    toma el primer pin disponible del pool de su categoría.
//!
//! Cada pin entregado, manual o automático, se retira de todos los pools,
//! por lo que el mapeo resultante es inyectivo. El resultado es
//! determinista para un mismo orden de declaración y una misma placa.

use crate::{
    board::{Board, Pin, Pool},
    error::{Generation, GenerationError, Reference},
    model::{Brick, BrickKind, Identifier},
};

use log::{debug, trace};
use std::collections::{HashMap, VecDeque};

/// Mapa de asignación de una corrida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocations {
    entries: Vec<Entry>,
}

/// Asignación de un brick, en orden de declaración.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub brick: Identifier,
    pub kind: BrickKind,
    pub wiring: Wiring,
}

/// Forma en que un brick se conecta a la placa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wiring {
    /// Pin tomado de un pool o especificado manualmente.
    Pin(Pin),

    /// Puerto serie por hardware, implícito en D0/D1.
    Serial,

    /// Cableado fijo del LCD.
    Lcd(Vec<Pin>),
}

impl Allocations {
    /// Obtiene el pin asignado a un brick.
    ///
    /// Consultar un brick sin pin registrado es un defecto de quien llama,
    /// no una condición recuperable, por lo cual se reporta como error.
    pub fn pin(&self, brick: &Identifier) -> Generation<Pin> {
        match self.get(brick) {
            Some(Wiring::Pin(pin)) => Ok(*pin),
            _ => Err(GenerationError::UnresolvedReference(
                Reference::Unallocated(brick.clone()),
            )),
        }
    }

    pub fn get(&self, brick: &Identifier) -> Option<&Wiring> {
        self.entries
            .iter()
            .find(|entry| &entry.brick == brick)
            .map(|entry| &entry.wiring)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }
}

/// Asigna un pin a cada brick.
pub fn allocate(bricks: &[Brick], board: Board) -> Generation<Allocations> {
    let mut allocator = PinAllocator::new(board);

    allocator.claim_manual(bricks)?;
    if bricks.iter().any(|brick| brick.kind == BrickKind::LcdDisplay) {
        allocator.reserve(&board.lcd_wiring());
    }

    allocator.claim_auto(bricks)?;
    Ok(allocator.finish(bricks))
}

struct PinAllocator {
    board: Board,
    pools: Vec<(Pool, VecDeque<Pin>)>,
    assigned: HashMap<Identifier, Pin>,
    claimed: HashMap<Pin, Identifier>,
}

impl PinAllocator {
    fn new(board: Board) -> Self {
        let pools = [Pool::Digital, Pool::Pwm, Pool::Analog]
            .iter()
            .map(|pool| (*pool, board.pool(*pool).into_iter().collect()))
            .collect();

        PinAllocator {
            board,
            pools,
            assigned: HashMap::new(),
            claimed: HashMap::new(),
        }
    }

    fn claim_manual(&mut self, bricks: &[Brick]) -> Generation<()> {
        for brick in bricks {
            let pin = match brick.pin {
                Some(pin) => pin,
                None => continue,
            };

            let pool = brick
                .kind
                .pool()
                .ok_or_else(|| GenerationError::FixedWiring(brick.name.clone()))?;

            if !self.board.has_pin(pin) {
                return Err(GenerationError::InvalidPin {
                    brick: brick.name.clone(),
                    pin,
                });
            } else if !self.board.in_pool(pool, pin) {
                return Err(GenerationError::IncompatiblePin {
                    brick: brick.name.clone(),
                    pin,
                    pool,
                });
            }

            if let Some(first) = self.claimed.get(&pin) {
                return Err(GenerationError::PinConflict {
                    pin,
                    first: first.clone(),
                    second: brick.name.clone(),
                });
            }

            debug!("{} <- {} (manual)", brick.name, pin.notation());
            self.record(&brick.name, pin);
        }

        Ok(())
    }

    fn reserve(&mut self, pins: &[Pin]) {
        for pin in pins {
            trace!("{} reserved for LCD", pin.notation());
            self.remove_everywhere(*pin);
        }
    }

    fn claim_auto(&mut self, bricks: &[Brick]) -> Generation<()> {
        for brick in bricks {
            if self.assigned.contains_key(&brick.name) {
                continue;
            }

            let pool = match brick.kind.pool() {
                Some(pool) => pool,
                None => continue,
            };

            let pin = self
                .take(pool)
                .ok_or_else(|| GenerationError::AllocationExhausted {
                    brick: brick.name.clone(),
                    pool,
                })?;

            debug!("{} <- {} ({} pool)", brick.name, pin.notation(), pool);
            self.record(&brick.name, pin);
        }

        Ok(())
    }

    fn finish(self, bricks: &[Brick]) -> Allocations {
        let entries = bricks
            .iter()
            .filter_map(|brick| {
                let wiring = match brick.kind {
                    BrickKind::SerialLine { .. } => Wiring::Serial,
                    BrickKind::LcdDisplay => Wiring::Lcd(self.board.lcd_wiring()),
                    _ => Wiring::Pin(*self.assigned.get(&brick.name)?),
                };

                Some(Entry {
                    brick: brick.name.clone(),
                    kind: brick.kind,
                    wiring,
                })
            })
            .collect();

        Allocations { entries }
    }

    fn take(&mut self, pool: Pool) -> Option<Pin> {
        self.pools
            .iter_mut()
            .find(|(kind, _)| *kind == pool)
            .and_then(|(_, free)| free.pop_front())
    }

    fn record(&mut self, brick: &Identifier, pin: Pin) {
        self.assigned.insert(brick.clone(), pin);
        self.claimed.insert(pin, brick.clone());
        self.remove_everywhere(pin);
    }

    fn remove_everywhere(&mut self, pin: Pin) {
        for (_, free) in self.pools.iter_mut() {
            free.retain(|other| *other != pin);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn allocate_when_no_manual_pins_then_takes_pools_in_declaration_order() {
        let bricks = vec![
            brick("button", BrickKind::DigitalSensor),
            brick("led", BrickKind::DigitalActuator),
            brick("knob", BrickKind::AnalogSensor),
            brick("dimmer", BrickKind::AnalogActuator),
        ];

        let pins = allocate(&bricks, Board::Uno).unwrap();

        assert_eq!(pins.pin(&id("button")).unwrap(), Pin::Digital(2));
        assert_eq!(pins.pin(&id("led")).unwrap(), Pin::Digital(3));
        assert_eq!(pins.pin(&id("knob")).unwrap(), Pin::Analog(0));
        // D3 ya fue tomado por `led`
        assert_eq!(pins.pin(&id("dimmer")).unwrap(), Pin::Digital(5));
    }

    #[test]
    fn allocate_when_manual_pin_then_keeps_it_and_skips_it() {
        let bricks = vec![
            brick("button", BrickKind::DigitalSensor),
            pinned("led", BrickKind::DigitalActuator, Pin::Digital(2)),
        ];

        let pins = allocate(&bricks, Board::Uno).unwrap();

        assert_eq!(pins.pin(&id("led")).unwrap(), Pin::Digital(2));
        assert_eq!(pins.pin(&id("button")).unwrap(), Pin::Digital(3));
    }

    #[test]
    fn allocate_when_lcd_present_then_skips_wiring_pins() {
        let bricks = vec![
            brick("screen", BrickKind::LcdDisplay),
            brick("button", BrickKind::DigitalSensor),
            brick("dimmer", BrickKind::AnalogActuator),
        ];

        let pins = allocate(&bricks, Board::Uno).unwrap();

        assert_eq!(pins.pin(&id("button")).unwrap(), Pin::Digital(6));
        assert_eq!(pins.pin(&id("dimmer")).unwrap(), Pin::Digital(9));
        assert_eq!(
            pins.get(&id("screen")),
            Some(&Wiring::Lcd(Board::Uno.lcd_wiring()))
        );
    }

    #[test]
    fn allocate_when_lcd_and_manual_wiring_pin_then_ok() {
        let bricks = vec![
            brick("screen", BrickKind::LcdDisplay),
            pinned("led", BrickKind::DigitalActuator, Pin::Digital(12)),
        ];

        let pins = allocate(&bricks, Board::Uno).unwrap();

        assert_eq!(pins.pin(&id("led")).unwrap(), Pin::Digital(12));
    }

    #[test]
    fn allocate_when_pool_exhausted_then_names_brick() {
        let mut bricks: Vec<_> = (0..6)
            .map(|i| brick(&format!("knob{}", i), BrickKind::AnalogSensor))
            .collect();
        bricks.push(brick("thermo", BrickKind::TemperatureSensor));

        match allocate(&bricks, Board::Uno) {
            Err(GenerationError::AllocationExhausted { brick, pool }) => {
                assert_eq!(brick, id("thermo"));
                assert_eq!(pool, Pool::Analog);
            }

            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn allocate_when_two_manual_pins_collide_then_conflict() {
        let bricks = vec![
            pinned("a", BrickKind::DigitalActuator, Pin::Digital(7)),
            pinned("b", BrickKind::DigitalSensor, Pin::Digital(7)),
        ];

        assert!(matches!(
            allocate(&bricks, Board::Uno),
            Err(GenerationError::PinConflict { .. })
        ));
    }

    #[test]
    fn allocate_when_manual_pin_in_wrong_pool_then_incompatible() {
        let bricks = vec![pinned("dimmer", BrickKind::AnalogActuator, Pin::Digital(8))];

        assert!(matches!(
            allocate(&bricks, Board::Uno),
            Err(GenerationError::IncompatiblePin {
                pool: Pool::Pwm,
                ..
            })
        ));
    }

    #[test]
    fn allocate_when_manual_pin_missing_from_board_then_invalid() {
        let bricks = vec![pinned("led", BrickKind::DigitalActuator, Pin::Digital(40))];

        assert!(matches!(
            allocate(&bricks, Board::Uno),
            Err(GenerationError::InvalidPin { .. })
        ));
        assert!(allocate(&bricks, Board::Mega).is_ok());
    }

    #[test]
    fn allocate_when_serial_has_manual_pin_then_fixed_wiring() {
        let bricks = vec![pinned(
            "console",
            BrickKind::SerialLine { baud: 9600 },
            Pin::Digital(0),
        )];

        assert!(matches!(
            allocate(&bricks, Board::Uno),
            Err(GenerationError::FixedWiring(_))
        ));
    }

    #[test]
    fn pin_when_brick_has_no_pin_then_unallocated() {
        let bricks = vec![brick("console", BrickKind::SerialLine { baud: 9600 })];
        let pins = allocate(&bricks, Board::Uno).unwrap();

        assert!(matches!(
            pins.pin(&id("console")),
            Err(GenerationError::UnresolvedReference(Reference::Unallocated(_)))
        ));
        assert!(pins.pin(&id("ghost")).is_err());
    }

    const KINDS: &[BrickKind] = &[
        BrickKind::DigitalSensor,
        BrickKind::AnalogSensor,
        BrickKind::TemperatureSensor,
        BrickKind::DigitalActuator,
        BrickKind::AnalogActuator,
        BrickKind::Buzzer,
        BrickKind::LcdDisplay,
    ];

    fn arb_bricks() -> impl Strategy<Value = Vec<Brick>> {
        let spec = (0..KINDS.len(), prop::option::weighted(0.3, 2u8..14));
        prop::collection::vec(spec, 0..16).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (kind, manual))| {
                    let kind = KINDS[kind];
                    let pin = match (kind.pool(), manual) {
                        (None, _) | (_, None) => None,
                        (Some(Pool::Analog), Some(n)) => Some(Pin::Analog(n % 6)),
                        (Some(_), Some(n)) => Some(Pin::Digital(n)),
                    };

                    Brick {
                        name: Identifier::new(format!("brick{}", i)),
                        pin,
                        kind,
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn allocate_when_any_bricks_then_no_pin_twice(bricks in arb_bricks()) {
            if let Ok(pins) = allocate(&bricks, Board::Uno) {
                let assigned: Vec<_> = pins
                    .iter()
                    .filter_map(|entry| match entry.wiring {
                        Wiring::Pin(pin) => Some(pin),
                        _ => None,
                    })
                    .collect();

                let distinct: HashSet<_> = assigned.iter().collect();
                prop_assert_eq!(distinct.len(), assigned.len());
            }
        }

        #[test]
        fn allocate_when_manual_pins_or_lcd_then_kept_and_avoided(bricks in arb_bricks()) {
            if let Ok(pins) = allocate(&bricks, Board::Uno) {
                let has_lcd = bricks.iter().any(|brick| brick.kind == BrickKind::LcdDisplay);
                let wiring = Board::Uno.lcd_wiring();

                for brick in bricks.iter().filter(|brick| brick.kind.pool().is_some()) {
                    let pin = pins.pin(&brick.name).unwrap();
                    match brick.pin {
                        Some(manual) => prop_assert_eq!(pin, manual),
                        None if has_lcd => prop_assert!(!wiring.contains(&pin)),
                        None => {}
                    }
                }
            }
        }

        #[test]
        fn allocate_when_run_twice_then_same_mapping(bricks in arb_bricks()) {
            let first = allocate(&bricks, Board::Uno).ok();
            let second = allocate(&bricks, Board::Uno).ok();

            prop_assert_eq!(first, second);
        }
    }
}
