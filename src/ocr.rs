//! OCR engines.
//!
//! OCR is a whole-document transform: PDF bytes in, PDF bytes with a
//! synthesized text layer out. The default engine shells out to
//! [`ocrmypdf`](https://ocrmypdf.readthedocs.io), staging files in a
//! temporary directory and enforcing a wall-clock timeout.

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};

/// Default OCR program.
pub const DEFAULT_OCR_PROGRAM: &str = "ocrmypdf";

/// Default OCR timeout.
pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(300);

/// How often a running OCR child is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Maximum number of stderr bytes kept in error messages.
const STDERR_TAIL: usize = 2048;

/// A full-document OCR transform.
pub trait OcrEngine {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Produce a new PDF with a text layer from `input`.
    fn ocr(&self, input: &[u8]) -> Result<Vec<u8>>;
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn ocr(&self, input: &[u8]) -> Result<Vec<u8>> {
        (**self).ocr(input)
    }
}

/// Configuration for the external OCR program.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Program to run
    pub program: PathBuf,

    /// Extra arguments placed before the input and output paths
    pub args: Vec<String>,

    /// Tesseract language codes, passed as `-l a+b`
    pub languages: Vec<String>,

    /// Wall-clock limit; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_OCR_PROGRAM),
            args: Vec::new(),
            languages: Vec::new(),
            timeout: Some(DEFAULT_OCR_TIMEOUT),
        }
    }
}

impl OcrConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the program to run.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set extra arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add an OCR language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for the OCR program without a time limit.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Full argument list for one run.
    fn command_args(&self, input: &str, output: &str) -> Vec<String> {
        let mut args = self.args.clone();
        if !self.languages.is_empty() {
            args.push("-l".to_string());
            args.push(self.languages.join("+"));
        }
        args.push(input.to_string());
        args.push(output.to_string());
        args
    }
}

/// OCR engine backed by the `ocrmypdf` command-line tool.
#[derive(Debug, Clone, Default)]
pub struct OcrMyPdf {
    config: OcrConfig,
}

impl OcrMyPdf {
    /// Create an engine with the given configuration.
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Access the configuration.
    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Check whether the program can be started (`--version` succeeds).
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for OcrMyPdf {
    fn name(&self) -> &str {
        "ocrmypdf"
    }

    fn ocr(&self, input: &[u8]) -> Result<Vec<u8>> {
        let dir = tempfile::tempdir()?;
        let input_path = dir.path().join("input.pdf");
        let output_path = dir.path().join("output.pdf");
        let stderr_path = dir.path().join("stderr.log");
        fs::write(&input_path, input)?;

        let args = self.config.command_args(
            &input_path.to_string_lossy(),
            &output_path.to_string_lossy(),
        );
        info!(
            "Running {} on {} bytes",
            self.config.program.display(),
            input.len()
        );
        debug!("OCR arguments: {:?}", args);

        // stderr goes to a file so a chatty child can never block on a full pipe.
        let child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(File::create(&stderr_path)?)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::OcrUnavailable(format!(
                    "'{}' not found",
                    self.config.program.display()
                )),
                _ => Error::OcrUnavailable(e.to_string()),
            })?;

        let started = Instant::now();
        let status = wait_with_timeout(child, self.config.timeout)?;
        debug!("OCR finished in {:?} with {}", started.elapsed(), status);

        if !status.success() {
            let stderr = fs::read(&stderr_path).unwrap_or_default();
            return Err(Error::Ocr(format!(
                "{} exited with {}: {}",
                self.config.program.display(),
                status,
                stderr_tail(&stderr)
            )));
        }

        let output = fs::read(&output_path)
            .map_err(|e| Error::Ocr(format!("no output produced: {}", e)))?;
        detect_format_from_bytes(&output)
            .map_err(|e| Error::Ocr(format!("output is not a PDF: {}", e)))?;
        Ok(output)
    }
}

/// Wait for a child, killing and reaping it once `timeout` elapses.
fn wait_with_timeout(mut child: Child, timeout: Option<Duration>) -> Result<ExitStatus> {
    let Some(timeout) = timeout else {
        return Ok(child.wait()?);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            // kill() fails only if the child already exited; wait() reaps either way.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::OcrTimeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OcrConfig::default();
        assert_eq!(config.program, PathBuf::from("ocrmypdf"));
        assert_eq!(config.timeout, Some(Duration::from_secs(300)));
        assert!(config.args.is_empty());
    }

    #[test]
    fn test_command_args() {
        let config = OcrConfig::new()
            .with_args(["--skip-text"])
            .with_language("eng")
            .with_language("deu");
        assert_eq!(
            config.command_args("in.pdf", "out.pdf"),
            vec!["--skip-text", "-l", "eng+deu", "in.pdf", "out.pdf"]
        );
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let engine = OcrMyPdf::new(OcrConfig::new().with_program("pdftriage-no-such-ocr-tool"));
        assert!(!engine.is_available());
        assert!(matches!(
            engine.ocr(b"%PDF-1.4\n"),
            Err(Error::OcrUnavailable(_))
        ));
    }

    #[test]
    fn test_stderr_tail() {
        assert_eq!(stderr_tail(b"  boom \n"), "boom");
        let long = vec![b'x'; STDERR_TAIL + 10];
        assert_eq!(stderr_tail(&long).len(), STDERR_TAIL);
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        fn shell(script: &str) -> OcrMyPdf {
            OcrMyPdf::new(
                OcrConfig::new()
                    .with_program("sh")
                    .with_args(["-c", script])
                    .with_timeout(Duration::from_secs(10)),
            )
        }

        #[test]
        fn test_successful_run_returns_output() {
            // $0 and $1 are the input and output paths appended by the engine.
            let engine = shell(r#"cp "$0" "$1""#);
            let output = engine.ocr(b"%PDF-1.4\n%%EOF\n").unwrap();
            assert_eq!(output, b"%PDF-1.4\n%%EOF\n");
        }

        #[test]
        fn test_non_pdf_output_is_rejected() {
            let engine = shell(r#"echo garbage > "$1""#);
            assert!(matches!(engine.ocr(b"%PDF-1.4\n"), Err(Error::Ocr(_))));
        }

        #[test]
        fn test_failure_reports_stderr() {
            let engine = shell("echo 'bad input' >&2; exit 2");
            match engine.ocr(b"%PDF-1.4\n") {
                Err(Error::Ocr(message)) => assert!(message.contains("bad input")),
                other => panic!("unexpected result: {:?}", other),
            }
        }

        #[test]
        fn test_timeout_kills_child() {
            let engine = OcrMyPdf::new(
                OcrConfig::new()
                    .with_program("sh")
                    .with_args(["-c", "sleep 5"])
                    .with_timeout(Duration::from_millis(200)),
            );
            let started = Instant::now();
            assert!(matches!(
                engine.ocr(b"%PDF-1.4\n"),
                Err(Error::OcrTimeout(_))
            ));
            assert!(started.elapsed() < Duration::from_secs(4));
        }
    }
}
