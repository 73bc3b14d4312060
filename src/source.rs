use std::io::{self, BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::Instant;

use thiserror::Error;

use crate::config::Config;
use crate::handoff::{Frame, FrameSender};
use crate::landmarks;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("provider command is empty")]
    EmptyCommand,
    #[error("failed to spawn provider {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("provider {0} has no stdout")]
    NoStdout(String),
    #[error("failed to start reader thread: {0}")]
    Thread(io::Error),
}

/// An external landmark provider process, killed when dropped.
pub struct Provider {
    program: String,
    child: Child,
    stopped: bool,
}

impl Provider {
    /// Spawn `argv` with piped stdout. The upstream detector settings are
    /// handed over as environment variables; nothing here interprets them.
    pub fn spawn(argv: &[String], config: &Config) -> Result<(Self, impl BufRead + Send), SourceError> {
        let (program, args) = argv.split_first().ok_or(SourceError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .env("GESTURE_MAX_NUM_HANDS", config.max_num_hands.to_string())
            .env(
                "GESTURE_MIN_DETECTION_CONFIDENCE",
                config.min_detection_confidence.to_string(),
            )
            .env(
                "GESTURE_MIN_TRACKING_CONFIDENCE",
                config.min_tracking_confidence.to_string(),
            )
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SourceError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::NoStdout(program.clone()))?;

        log::info!("Started landmark provider {program} (pid {})", child.id());
        Ok((
            Self {
                program: program.clone(),
                child,
                stopped: false,
            },
            BufReader::new(stdout),
        ))
    }

    /// Kill and reap the child. Safe to call more than once.
    pub fn stop(&mut self) {
        if std::mem::replace(&mut self.stopped, true) {
            return;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                log::info!("Provider {} exited with {status}", self.program);
                return;
            }
            Ok(None) => {}
            Err(e) => log::warn!("Could not poll provider {}: {e}", self.program),
        }
        if let Err(e) = self.child.kill() {
            log::warn!("Failed to kill provider {}: {e}", self.program);
        }
        if let Err(e) = self.child.wait() {
            log::warn!("Failed to reap provider {}: {e}", self.program);
        }
        log::info!("Provider {} stopped", self.program);
    }
}

impl Drop for Provider {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read provider lines on a dedicated OS thread and publish them as frames.
/// The thread ends on EOF, on a read error, or once the handoff is closed.
pub fn start_reader<R>(
    reader: R,
    sender: FrameSender,
    started: Instant,
) -> Result<JoinHandle<()>, SourceError>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("landmark-reader".into())
        .spawn(move || read_loop(reader, sender, started))
        .map_err(SourceError::Thread)
}

fn read_loop<R: BufRead>(reader: R, sender: FrameSender, started: Instant) {
    for (lineno, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Landmark stream read error: {e}");
                return;
            }
        };

        let sample = match landmarks::parse_line(&line) {
            Ok(sample) => sample,
            Err(e) => {
                log::warn!("Skipping undecodable landmark line {}: {e}", lineno + 1);
                continue;
            }
        };

        let frame = Frame {
            sample,
            at: started.elapsed(),
        };
        if !sender.publish(frame) {
            log::debug!("Handoff closed, landmark reader exiting");
            return;
        }
    }
    log::info!("Landmark stream ended");
}
