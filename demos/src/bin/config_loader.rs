// SPDX-License-Identifier: Apache-2.0

// Loads an editor config file and prints the settings it resolves to.
//
//     cargo run -p demos --bin config_loader -- settings.json

use std::env;
use std::fs::File;
use std::process::ExitCode;

use picotree::{free, IoReader, MemoryLimit, TreeParser, Value};

const DEFAULT_THEME: &str = "default";

/// Config files are small; anything needing more than this is rejected.
const CONFIG_MEMORY_LIMIT: usize = 64 * 1024;

#[derive(Debug)]
struct Config {
    use_tabs: bool,
    indent_width: u32,
    rulers: Vec<u32>,
    theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_tabs: false,
            indent_width: 4,
            rulers: Vec::new(),
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

/// A number that is a whole, positive `u32`.
fn positive_int(value: &Value) -> Option<u32> {
    let n = value.as_f64()?;
    if n >= 1.0 && n <= f64::from(u32::MAX) && n.fract() == 0.0 {
        Some(n as u32)
    } else {
        None
    }
}

/// Apply every recognized member in document order. Unknown keys are ignored.
fn load_config(value: &Value) -> Result<Config, String> {
    let members = value.as_object().ok_or("config root must be an object")?;
    let mut config = Config::default();
    for member in members {
        let value = &member.value;
        match member.key.as_slice() {
            b"use_tabs" => {
                config.use_tabs = value.as_bool().ok_or("use_tabs must be a boolean")?;
            }
            b"indent_width" => {
                config.indent_width =
                    positive_int(value).ok_or("indent_width must be a positive integer")?;
            }
            b"rulers" => {
                config.rulers = value
                    .as_array()
                    .ok_or("rulers must be an array")?
                    .iter()
                    .map(|ruler| positive_int(ruler).ok_or("rulers must be positive integers"))
                    .collect::<Result<_, _>>()?;
            }
            b"theme" => {
                config.theme = value
                    .as_str()
                    .ok_or("theme must be a string")?
                    .to_string();
            }
            other => {
                log::debug!("config_loader: ignoring key {:?}", String::from_utf8_lossy(other));
            }
        }
    }
    Ok(config)
}

fn print_config(config: &Config) {
    println!("use tabs: {}", config.use_tabs);
    println!("indent width: {}", config.indent_width);
    print!("rulers:");
    for ruler in &config.rulers {
        print!(" {ruler}");
    }
    println!();
    println!("theme: {}", config.theme);
}

/// The single config path argument, or the program name for the usage line.
fn config_path(mut args: impl Iterator<Item = String>) -> Result<String, String> {
    let program = args.next().unwrap_or_else(|| "config_loader".to_string());
    match (args.next(), args.next()) {
        (Some(path), None) => Ok(path),
        _ => Err(program),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let path = match config_path(env::args()) {
        Ok(path) => path,
        Err(program) => {
            eprintln!("Usage: {} config.json", program);
            return ExitCode::FAILURE;
        }
    };
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: Unable to open file '{}': {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let mut window = [0u8; 128];
    let mut limit = MemoryLimit::new(CONFIG_MEMORY_LIMIT);
    let parser = TreeParser::with_allocator(IoReader::new(file), &mut window, &mut limit);
    let value = match parser.parse() {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: failed to parse config file '{}': {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("config_loader: tree uses {} bytes", limit.in_use());

    let loaded = load_config(&value);
    free(&mut limit, value);

    match loaded {
        Ok(config) => {
            print_config(&config);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to load config file '{}': {}", path, e);
            ExitCode::FAILURE
        }
    }
}
