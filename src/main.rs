//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases de la generación y expone
//! una CLI.

use anyhow::{self, bail, Context};
use arduinoml::{board::Board, logger, source, target};
use clap::{
    builder::PossibleValuesParser, crate_version, value_parser, Arg, ArgAction, Command,
};
use log::info;

use std::{
    fs::{self, File},
    io::{self, Write},
};

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("ArduinoML firmware generator")
        .version(crate_version!())
        .arg(
            Arg::new("board")
                .short('b')
                .long("board")
                .value_name("BOARD")
                .takes_value(true)
                .default_value("uno")
                .value_parser(PossibleValuesParser::new(Board::NAMES.iter().copied()))
                .ignore_case(true)
                .help("Target board"),
        )
        .arg(
            Arg::new("debounce")
                .short('d')
                .long("debounce")
                .value_name("MILLIS")
                .takes_value(true)
                .default_value("200")
                .value_parser(value_parser!(u32))
                .help("Debounce interval for digital sensors"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Increase log verbosity (up to -vvvv)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .takes_value(true)
                .required(true)
                .value_name("FILE")
                .help("Output sketch ('-' for stdout)"),
        )
        .arg(
            Arg::new("model")
                .required(true)
                .value_name("MODEL")
                .help("Model document in JSON ('-' for stdin)"),
        )
        .get_matches();

    // Se extraen argumentos necesarios
    logger::configure(args.get_count("verbose")).map_err(anyhow::Error::msg)?;

    let board = args
        .get_one::<String>("board")
        .map(String::as_str)
        .unwrap_or("uno")
        .parse::<Board>()
        .context("Bad board name")?;

    let options = target::Options {
        board,
        debounce: args.get_one::<u32>("debounce").copied().unwrap_or(200),
    };

    let model = args.get_one::<String>("model").context("Missing model")?;
    let output = args.get_one::<String>("output").context("Missing output")?;

    let app = match model.as_str() {
        "-" => source::load(io::stdin().lock(), "<stdin>")?,
        path => {
            let file =
                File::open(path).with_context(|| format!("Failed to open model: {}", path))?;

            source::load(io::BufReader::new(file), path)?
        }
    };

    // El artefacto se construye completo antes de tocar la salida
    let sketch = match target::generate(&app, &options) {
        Ok(sketch) => sketch,
        Err(diagnostics) => bail!(diagnostics),
    };

    match output.as_str() {
        "-" => {
            let mut stdout = io::stdout();
            stdout
                .write_all(sketch.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to emit to stdout")?;
        }

        path => {
            fs::write(path, sketch)
                .with_context(|| format!("Failed to emit to file: {}", path))?;

            info!("Wrote sketch for `{}` to {}", app.name, path);
        }
    }

    Ok(())
}
