//! Printing through a headless Chromium-based browser.

use flatbook::render::{RenderError, RenderResult};
use flatbook::{RenderRequest, Renderer};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A [`Renderer`] that prints the markup to PDF using `--headless --print-to-pdf`.
#[derive(Clone, Debug)]
pub struct ChromeRenderer {
    program: String,
    wait: Duration,
    settle: Duration,
}

impl ChromeRenderer {
    /// - `wait`: how long the browser may take to load and print before it is killed.
    /// - `settle`: fixed delay after the browser exits, as the output is never confirmed.
    pub fn new(program: impl Into<String>, wait: Duration, settle: Duration) -> Self {
        Self {
            program: program.into(),
            wait,
            settle,
        }
    }

    fn launch(&self, request: &RenderRequest) -> RenderResult<Child> {
        let output = std::path::absolute(&request.output_path)
            .unwrap_or_else(|_| request.output_path.clone());

        Command::new(&self.program)
            .args(["--headless", "--disable-gpu", "--no-pdf-header-footer"])
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(&request.markup_url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.launch_error(source))
    }

    fn launch_error(&self, source: std::io::Error) -> RenderError {
        RenderError::Launch {
            source,
            program: self.program.clone(),
        }
    }
}

impl Renderer for ChromeRenderer {
    fn render(&self, request: &RenderRequest) -> RenderResult<()> {
        let mut child = self.launch(request)?;
        log::debug!("Launched `{}` (pid {})", self.program, child.id());

        // Drained on another thread so a chatty browser never blocks on a full pipe
        let stderr = child.stderr.take();
        let drain = thread::spawn(move || {
            let mut buf = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut buf);
            }
            buf
        });

        let deadline = Instant::now() + self.wait;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    log::warn!("`{}` did not finish within {:?}; stopping it", self.program, self.wait);
                    stop(&mut child);
                    return Err(RenderError::Timeout(self.wait));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(error) => {
                    stop(&mut child);
                    return Err(self.launch_error(error));
                }
            }
        };
        let stderr = drain.join().unwrap_or_default();

        if !status.success() {
            return Err(RenderError::Failed {
                status,
                stderr: stderr.trim().to_owned(),
            });
        }

        thread::sleep(self.settle);
        Ok(())
    }
}

/// Kills and reaps `child`, leaving no zombie behind.
fn stop(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
