// SPDX-License-Identifier: Apache-2.0

// Runs `env` with an environment built from a JSON object.
//
//     cargo run -p demos --bin env_inject -- '{"FOO": "a", "BAR": "b"}'

use std::env;
use std::ffi::OsString;
use std::process::{Command, ExitCode};

use picotree::{from_slice, Value};

const DEFAULT_ENVIRONMENT: &str = r#"{"FOO": "a", "BAR": "b"}"#;

#[cfg(unix)]
fn to_os_string(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes.to_vec())
}

#[cfg(not(unix))]
fn to_os_string(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Collect `KEY=value` pairs from an object whose members are all strings.
fn environment(value: &Value) -> Result<Vec<(OsString, OsString)>, String> {
    let members = value.as_object().ok_or("environment must be an object")?;
    members
        .iter()
        .map(|member| {
            let text = member.value.as_bytes().ok_or_else(|| {
                format!(
                    "value of {:?} must be a string",
                    String::from_utf8_lossy(&member.key)
                )
            })?;
            if member.key.is_empty() || member.key.contains(&b'=') || member.key.contains(&0) {
                return Err(format!(
                    "invalid variable name {:?}",
                    String::from_utf8_lossy(&member.key)
                ));
            }
            Ok((to_os_string(&member.key), to_os_string(text)))
        })
        .collect()
}

fn main() -> ExitCode {
    env_logger::init();

    let input = env::args().nth(1).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
    let value = match from_slice(input.as_bytes()) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: invalid environment JSON: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let vars = match environment(&value) {
        Ok(vars) => vars,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::debug!("env_inject: passing {} variables", vars.len());

    match Command::new("env").env_clear().envs(vars).status() {
        Ok(status) if status.success() => ExitCode::SUCCESS,
        Ok(status) => {
            eprintln!("Error: env exited with {}", status);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: unable to run env: {}", e);
            ExitCode::FAILURE
        }
    }
}
