//! Purpose: Hold top-level CLI command dispatch for `keycodec`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Output is written only after the whole command succeeded.

use super::*;

use keycodec::api::{
    AnyKey, DateFormat, DateTransform, Decoder, PatternFormat, Rfc3339Format, decode_bytes,
    encode_value,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Lookup {
    Required,
    IfPresent,
    Lossy,
}

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::aot::generate(shell, &mut cmd, "keycodec", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Transcode {
            from,
            to,
            pretty,
            input,
        } => {
            let bytes = read_input(input.as_deref())?;
            let value: Value = decode_bytes(&bytes, Some(&from))?;
            let to = if pretty && matches!(to, Engine::Json(_)) {
                Engine::json_pretty()
            } else {
                to
            };
            let mut encoded = encode_value(&value, Some(&to))?;
            if matches!(to, Engine::Json(_)) {
                encoded.push(b'\n');
            }
            write_output(&encoded)?;
            Ok(RunOutcome::ok())
        }
        Command::Get {
            keys,
            value_type,
            if_present,
            lossy,
            date_pattern,
            from,
            input,
        } => {
            let bytes = read_input(input.as_deref())?;
            let document: Value = decode_bytes(&bytes, Some(&from))?;
            let (containers, key) = keys.split_at(keys.len() - 1);
            let key = AnyKey::new(key[0].as_str());

            let mut decoder = Decoder::new(&document);
            for name in containers {
                decoder = decoder.nested(name.as_str())?;
            }

            let lookup = match (lossy, if_present) {
                (true, _) => Lookup::Lossy,
                (false, true) => Lookup::IfPresent,
                (false, false) => Lookup::Required,
            };
            let value = match date_pattern {
                Some(pattern) => get_date(&decoder, &key, &pattern, lookup)?,
                None => match value_type {
                    ValueType::Any => get_as::<Value>(&decoder, &key, lookup)?,
                    ValueType::Int => get_as::<i64>(&decoder, &key, lookup)?,
                    ValueType::Float => get_as::<f64>(&decoder, &key, lookup)?,
                    ValueType::String => get_as::<String>(&decoder, &key, lookup)?,
                    ValueType::Bool => get_as::<bool>(&decoder, &key, lookup)?,
                },
            };
            emit_json(&value);
            Ok(RunOutcome::ok())
        }
    }
}

fn get_as<T>(decoder: &Decoder<'_>, key: &AnyKey, lookup: Lookup) -> Result<Value, Error>
where
    T: DeserializeOwned + Serialize,
{
    match lookup {
        Lookup::Required => to_json(&decoder.decode::<T, _>(key)?),
        Lookup::IfPresent => to_json(&decoder.decode_if_present::<T, _>(key)?),
        Lookup::Lossy => to_json(&decoder.decode_array_lossy::<T, _>(key)?),
    }
}

fn get_date(
    decoder: &Decoder<'_>,
    key: &AnyKey,
    pattern: &str,
    lookup: Lookup,
) -> Result<Value, Error> {
    let format = PatternFormat::new(pattern)?;
    let date = match lookup {
        Lookup::IfPresent => decoder.decode_if_present_with(key, DateTransform(&format))?,
        _ => Some(decoder.decode_date(key, &format)?),
    };
    match date {
        Some(date) => Ok(Value::String(Rfc3339Format.format(&date)?)),
        None => Ok(Value::Null),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Encode)
            .with_message("failed to render result")
            .with_source(err)
    })
}
