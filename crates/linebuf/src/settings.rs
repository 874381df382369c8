//! `name=value` settings files.
//!
//! Each line holds one setting, written as `name=value\r\n`. Values are
//! decimal integers, `0`/`1` for booleans, or raw text. Loading applies every
//! line whose name matches a binding and leaves the other bindings untouched;
//! lines that do not split into exactly two fields on `=` are skipped.

use alloc::string::{String, ToString};
use core::fmt::Write as _;

use platform::{write_all, Store};

use crate::error::LineError;
use crate::line_reader::LineReader;
use crate::split::{split_string, trim};

/// Mutable reference to the variable a setting is stored in.
#[derive(Debug)]
pub enum Setting<'a> {
    /// Signed 64-bit integer.
    I64(&'a mut i64),
    /// Signed 32-bit integer.
    I32(&'a mut i32),
    /// Unsigned 32-bit integer.
    U32(&'a mut u32),
    /// Unsigned 8-bit integer.
    U8(&'a mut u8),
    /// Free text (no newlines).
    Str(&'a mut String),
    /// Boolean, stored as `0` or `1`.
    Bool(&'a mut bool),
}

/// A setting name bound to the variable holding its value.
#[derive(Debug)]
pub struct BoundSetting<'a> {
    name: &'a str,
    value: Setting<'a>,
}

impl<'a> BoundSetting<'a> {
    /// Bind `name` to `value`.
    pub fn new(name: &'a str, value: Setting<'a>) -> Self {
        Self { name, value }
    }

    /// Setting name as it appears in the file.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Parse `text` into the bound variable.
    ///
    /// Surrounding whitespace is ignored. Returns `false`, leaving the
    /// variable unchanged, if `text` is not a valid value for its type.
    pub fn parse(&mut self, text: &str) -> bool {
        let text = trim(text);
        match &mut self.value {
            Setting::I64(v) => assign(text.parse().ok(), v),
            Setting::I32(v) => assign(text.parse().ok(), v),
            Setting::U32(v) => assign(text.parse().ok(), v),
            Setting::U8(v) => assign(text.parse().ok(), v),
            Setting::Bool(v) => assign(text.parse::<i64>().ok().map(|n| n != 0), v),
            Setting::Str(v) => {
                **v = text.to_string();
                true
            }
        }
    }

    /// Write `name=value\r\n` at the store cursor.
    pub fn write<S: Store + ?Sized>(&self, store: &mut S) -> Result<(), S::Error> {
        // Longest value: "-9223372036854775808".
        let mut number: heapless::String<24> = heapless::String::new();
        let value: &str = match &self.value {
            Setting::I64(v) => format_into(&mut number, **v),
            Setting::I32(v) => format_into(&mut number, **v),
            Setting::U32(v) => format_into(&mut number, **v),
            Setting::U8(v) => format_into(&mut number, **v),
            Setting::Bool(v) => {
                if **v {
                    "1"
                } else {
                    "0"
                }
            }
            Setting::Str(v) => v.as_str(),
        };
        write_all(store, self.name.as_bytes())?;
        write_all(store, b"=")?;
        write_all(store, value.as_bytes())?;
        write_all(store, b"\r\n")?;
        Ok(())
    }
}

fn assign<T>(parsed: Option<T>, slot: &mut &mut T) -> bool {
    match parsed {
        Some(value) => {
            **slot = value;
            true
        }
        None => false,
    }
}

fn format_into<T: core::fmt::Display>(buf: &mut heapless::String<24>, value: T) -> &str {
    buf.clear();
    if write!(buf, "{value}").is_err() {
        buf.clear();
    }
    buf.as_str()
}

/// Apply the settings found in `store` to `bindings`.
///
/// Returns how many lines were applied. Unknown names, malformed lines and
/// unparsable values are skipped.
pub fn load_settings<S: Store>(store: &mut S, bindings: &mut [BoundSetting<'_>]) -> usize {
    let mut applied = 0usize;
    for line in &mut LineReader::<&mut S, 4>::new(store) {
        let fields = split_string(&line, '=');
        let [name, value] = fields.as_slice() else {
            continue;
        };
        let name = trim(name);
        if let Some(binding) = bindings.iter_mut().find(|b| b.name == name) {
            if binding.parse(value) {
                applied = applied.saturating_add(1);
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(applied, "settings loaded");
    #[cfg(feature = "defmt")]
    defmt::debug!("settings loaded: {=usize}", applied);

    applied
}

/// Replace the contents of `store` with `bindings`, one line each.
pub fn save_settings<S: Store>(
    store: &mut S,
    bindings: &[BoundSetting<'_>],
) -> Result<(), LineError<S::Error>> {
    store.seek(0)?;
    for binding in bindings {
        binding.write(store)?;
    }
    store.truncate()?;
    store.sync()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use platform::mocks::MemoryStore;

    #[test]
    fn save_writes_crlf_lines() {
        let mut volume = -12i64;
        let mut channel = 7u8;
        let mut label = String::from("kitchen");
        let mut muted = true;
        let bindings = [
            BoundSetting::new("volume", Setting::I64(&mut volume)),
            BoundSetting::new("channel", Setting::U8(&mut channel)),
            BoundSetting::new("label", Setting::Str(&mut label)),
            BoundSetting::new("muted", Setting::Bool(&mut muted)),
        ];
        let mut store = MemoryStore::from("stale contents that are longer than the new ones ....");
        save_settings(&mut store, &bindings).unwrap();
        assert_eq!(
            store.to_string_lossy(),
            "volume=-12\r\nchannel=7\r\nlabel=kitchen\r\nmuted=1\r\n"
        );
        assert_eq!(store.sync_count(), 1);
    }

    #[test]
    fn load_applies_known_names_only() {
        let mut store =
            MemoryStore::from("freq=433920000\r\nunknown=5\r\nbroken\r\na=b=c\r\nenabled=0\r\nname= x \r\n");
        let mut freq = 0u32;
        let mut enabled = true;
        let mut name = String::new();
        let mut bindings = [
            BoundSetting::new("freq", Setting::U32(&mut freq)),
            BoundSetting::new("enabled", Setting::Bool(&mut enabled)),
            BoundSetting::new("name", Setting::Str(&mut name)),
        ];
        assert_eq!(load_settings(&mut store, &mut bindings), 3);
        drop(bindings);
        assert_eq!(freq, 433_920_000);
        assert!(!enabled);
        assert_eq!(name, "x");
    }

    #[test]
    fn unparsable_value_keeps_old_value() {
        let mut store = MemoryStore::from("level=loud\nsmall=300\n");
        let mut level = 3i32;
        let mut small = 1u8;
        let mut bindings = [
            BoundSetting::new("level", Setting::I32(&mut level)),
            BoundSetting::new("small", Setting::U8(&mut small)),
        ];
        assert_eq!(load_settings(&mut store, &mut bindings), 0);
        drop(bindings);
        assert_eq!(level, 3);
        assert_eq!(small, 1);
    }

    #[test]
    fn save_then_load_restores_values() {
        let mut store = MemoryStore::from("");
        {
            let mut a = i64::MIN;
            let mut b = u32::MAX;
            let bindings = [
                BoundSetting::new("a", Setting::I64(&mut a)),
                BoundSetting::new("b", Setting::U32(&mut b)),
            ];
            save_settings(&mut store, &bindings).unwrap();
        }
        let mut a = 0i64;
        let mut b = 0u32;
        let mut bindings = [
            BoundSetting::new("a", Setting::I64(&mut a)),
            BoundSetting::new("b", Setting::U32(&mut b)),
        ];
        assert_eq!(load_settings(&mut store, &mut bindings), 2);
        drop(bindings);
        assert_eq!((a, b), (i64::MIN, u32::MAX));
    }

    #[test]
    fn save_propagates_store_errors() {
        let mut flag = false;
        let bindings = [BoundSetting::new("flag", Setting::Bool(&mut flag))];
        let mut store = MemoryStore::from("");
        store.fail_writes(true);
        assert!(save_settings(&mut store, &bindings).unwrap_err().is_store());
    }
}
