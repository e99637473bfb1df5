//! Constructores de modelos para pruebas.

use crate::{
    board::Pin,
    model::{
        Action, App, Brick, BrickKind, Comparison, Condition, Expression, Identifier, Level,
        Logical, Machine, State, Transition,
    },
};

pub fn id(name: &str) -> Identifier {
    Identifier::from(name)
}

pub fn brick(name: &str, kind: BrickKind) -> Brick {
    Brick {
        name: id(name),
        pin: None,
        kind,
    }
}

pub fn pinned(name: &str, kind: BrickKind, pin: Pin) -> Brick {
    Brick {
        name: id(name),
        pin: Some(pin),
        kind,
    }
}

/// `brick is HIGH`
pub fn digital(brick: &str) -> Expression {
    Expression::Condition(Condition::Digital {
        brick: id(brick),
        level: Level::High,
    })
}

pub fn analog(brick: &str, operator: Comparison, threshold: f64) -> Expression {
    Expression::Condition(Condition::Analog {
        brick: id(brick),
        operator,
        threshold,
    })
}

pub fn serial(brick: &str, message: &str) -> Expression {
    Expression::Condition(Condition::Serial {
        brick: id(brick),
        message: message.to_owned(),
    })
}

pub fn and(left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        operator: Logical::And,
        right: Box::new(right),
    }
}

pub fn or(left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        operator: Logical::Or,
        right: Box::new(right),
    }
}

pub fn digital_write(actuator: &str, level: Level) -> Action {
    Action::DigitalWrite {
        actuator: id(actuator),
        level,
    }
}

pub fn transition(guard: Expression, next: &str) -> Transition {
    Transition {
        guard,
        next: id(next),
    }
}

pub fn state(name: &str, actions: Vec<Action>, transitions: Vec<Transition>) -> State {
    State {
        name: id(name),
        actions,
        transitions,
    }
}

pub fn machine(name: &str, period: u32, states: Vec<State>) -> Machine {
    let initial = states[0].name.clone();
    Machine {
        name: id(name),
        initial,
        states,
        period: Some(period),
    }
}

/// Un botón que alterna un LED entre `off` y `on`.
pub fn switch_app() -> App {
    App {
        name: String::from("Switch"),
        bricks: vec![
            brick("button", BrickKind::DigitalSensor),
            brick("led", BrickKind::DigitalActuator),
        ],
        initial: Some(id("off")),
        states: vec![
            state(
                "off",
                vec![digital_write("led", Level::Low)],
                vec![transition(digital("button"), "on")],
            ),
            state(
                "on",
                vec![digital_write("led", Level::High)],
                vec![transition(digital("button"), "off")],
            ),
        ],
        machines: vec![],
    }
}
