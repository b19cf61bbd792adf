//! sandbox.rs
//!
//! Hermetic scratch directory for CLI tests.
//! - Everything lives under an `assert_fs::TempDir` and is cleaned up on drop
//! - Commands run with a minimal environment: no `RUST_LOG`, no colors
//! - Cargo binaries are located with `assert_cmd` and driven through `duct`
//!
//! ## Quick example
//! ```no_run
//! use gcode_transform_test_utils::Sandbox;
//!
//! let mut sb = Sandbox::new();
//! sb.write("part.gcode", "G1 X10 Y0\n");
//!
//! let out = sb.run("gcode-transform", ["--rotate", "90", "--center", "0x0", "part.gcode"]);
//! assert_eq!(out.unwrap(), "G1 X0.000 Y-10.000\n");
//! ```

use assert_fs::TempDir;
use duct::Expression;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

pub struct Sandbox {
    root: TempDir,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Create a new sandbox; all state is under an auto-cleaned TempDir.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        Self { root }
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Write/overwrite a file relative to the sandbox root.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.root_path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Read a file relative to the sandbox root.
    pub fn read<P: AsRef<Path>>(&self, rel: P) -> String {
        fs::read_to_string(self.root_path().join(rel)).expect("read file")
    }

    /// Build a `duct::Expression` for a cargo binary, pre-wired with the
    /// sandbox env, running in the sandbox root. Chain `.stdin_bytes()`, `.unchecked()`, etc.
    pub fn cmd<I>(&self, program: &str, args: I) -> Expression
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program)
            .to_string_lossy()
            .to_string();
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().to_string())
            .collect();

        let expr = duct::cmd(&cargo_bin_path, args).dir(self.root_path());
        self.inject_env(expr)
    }

    /// Run a cargo binary inside this sandbox and return stdout as String.
    /// Errors if the process exits with non-zero status.
    pub fn run<I>(&self, program: &str, args: I) -> Result<String, String>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        read_stdout(self.cmd(program, args)).map_err(|e| format!("command failed: {e}"))
    }

    /// Run a cargo binary and render exit code, stdout and stderr as one
    /// string suitable for a snapshot. Never fails on non-zero exit.
    pub fn snapshot_run<I>(&self, program: &str, args: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let output = self
            .cmd(program, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .expect("spawn command");
        render_output(
            output.status.code(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )
    }

    pub fn inject_env(&self, expr: Expression) -> Expression {
        let mut env_map: HashMap<String, String> = HashMap::new();
        if let Ok(path) = std::env::var("PATH") {
            env_map.insert("PATH".into(), path);
        }
        env_map.insert("NO_COLOR".into(), "1".into());
        env_map.insert("CLICOLOR".into(), "0".into());
        expr.full_env(&env_map)
    }
}

/// Exit code, stdout and stderr with the sandbox's temp paths left as-is.
pub fn render_output(code: Option<i32>, stdout: &str, stderr: &str) -> String {
    let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    format!("exit: {code}\n--- stdout\n{stdout}--- stderr\n{stderr}")
}

/// Like `Expression::read`, but keeps the trailing newline that `read` trims.
fn read_stdout(expr: Expression) -> std::io::Result<String> {
    let output = expr.stdout_capture().run()?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
