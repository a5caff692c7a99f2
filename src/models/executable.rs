//! Executable test capability
//!
//! Anything that can be turned into a shell command for the test binary.

use std::collections::BTreeMap;

/// Options passed to the test binary as `--key [value]`.
///
/// A `None` value is rendered as a bare flag. The map is ordered so that the
/// same options always produce the same command string.
pub type CommandOptions = BTreeMap<String, Option<String>>;

/// A unit the external runner can spawn as one process
pub trait ExecutableTest {
    /// Path of the test file handed to the binary
    fn path(&self) -> &str;

    /// Fully-qualified class name handed to the binary
    fn class_name(&self) -> &str;

    /// Build the shell command that runs this test with `binary`
    fn command_string(&self, binary: &str, options: &CommandOptions) -> String {
        base_command(binary, options, self.class_name(), self.path())
    }
}

/// Build `<binary> [--key [value]]... <class_name> <path>` with every piece quoted
pub fn base_command(
    binary: &str,
    options: &CommandOptions,
    class_name: &str,
    path: &str,
) -> String {
    let mut parts = Vec::with_capacity(options.len() * 2 + 3);
    parts.push(shell_quote(binary));

    for (key, value) in options {
        parts.push(shell_quote(&format!("--{key}")));
        if let Some(value) = value {
            parts.push(shell_quote(value));
        }
    }

    parts.push(shell_quote(class_name));
    parts.push(shell_quote(path));
    parts.join(" ")
}

/// Quote a value as a single POSIX shell word.
///
/// NUL bytes cannot be passed through a shell and are dropped.
pub fn shell_quote(value: &str) -> String {
    let sanitized = value.replace('\0', "");
    match shlex::try_quote(&sanitized) {
        Ok(quoted) => quoted.into_owned(),
        Err(_) => sanitized.clone(),
    }
}
