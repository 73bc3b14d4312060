use std::fmt;
use std::future::Future;

use crate::dispatcher::{Connection, SendOutcome};
use crate::handoff::FrameReceiver;

use super::pipeline::{Pipeline, TickOutcome};

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Interrupted,
    UpstreamClosed,
    SendFailed(String),
}

impl SessionEnd {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::SendFailed(_))
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => f.write_str("interrupted"),
            Self::UpstreamClosed => f.write_str("upstream closed"),
            Self::SendFailed(reason) => write!(f, "send failed: {reason}"),
        }
    }
}

/// Drive the pipeline from the handoff until shutdown, upstream EOF or a
/// fatal send failure. The handoff and the connection are closed on every
/// exit path before this returns.
pub async fn run<C, S>(pipeline: &mut Pipeline<C>, frames: &FrameReceiver, shutdown: S) -> SessionEnd
where
    C: Connection,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let end = loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::info!("Shutdown requested");
                break SessionEnd::Interrupted;
            }
            frame = frames.next() => {
                let Some(frame) = frame else {
                    break SessionEnd::UpstreamClosed;
                };
                if let TickOutcome::Attempted(_, SendOutcome::Failed(reason)) =
                    pipeline.tick(frame.sample.as_ref(), frame.at)
                {
                    break SessionEnd::SendFailed(reason);
                }
            }
        }
    };

    frames.close();
    pipeline.close();
    end
}
