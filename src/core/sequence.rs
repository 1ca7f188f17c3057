//! # Priority sequencing for bulk render and refresh.
//!
//! A [`Sequence`] walks a priority list one name at a time. For each name it
//! asks the manager to render (or refresh) with a step callback, learns from
//! the ack how many callbacks the step produced, and waits for all of them
//! before moving on. The remainder is then processed without ordering.
//!
//! ```text
//! Sequence task                          Manager task
//!   ── Render{B, step, ack} ───────────►  render B slots
//!   ◄───────────────── ack(n) ──────────
//!   wait n × step signal   ◄── resolve ─  (surface reported)
//!   ── Render{A, step, ack} ───────────►  ...
//!   ── RenderUntouched{cb} ────────────►  render the rest
//! ```
//!
//! The task only holds a command sender. If the manager stops, sends fail or
//! step callbacks are dropped unfired, and the sequence ends quietly.

use tokio::sync::{mpsc, oneshot};

use crate::slots::Callback;

use super::command::{Command, CommandTx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Render,
    Refresh,
}

pub(crate) struct Sequence {
    tx: CommandTx,
    mode: Mode,
    order: Vec<String>,
    cb: Callback,
}

impl Sequence {
    pub(crate) fn new(tx: CommandTx, mode: Mode, order: Vec<String>, cb: Callback) -> Self {
        Self { tx, mode, order, cb }
    }

    /// Runs the sequence in its own task.
    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(self) {
        for name in &self.order {
            if !self.step(name).await {
                tracing::debug!(name = %name, "priority sequence stopped");
                return;
            }
        }

        let cb = self.cb.clone();
        let rest = match self.mode {
            Mode::Render => Command::RenderUntouched { cb },
            Mode::Refresh => Command::RefreshUntouched { cb },
        };
        let _ = self.tx.send(rest);
    }

    /// Processes one priority name. Returns `false` if the manager went away.
    async fn step(&self, name: &str) -> bool {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<()>();
        let user = self.cb.clone();
        let step = Callback::new(move |outcome| {
            let _done = StepDone(&done_tx);
            user.call(outcome);
        });

        let (ack_tx, ack_rx) = oneshot::channel();
        let name = name.to_string();
        let cmd = match self.mode {
            Mode::Render => Command::Render {
                name,
                cb: step,
                ack: Some(ack_tx),
            },
            Mode::Refresh => Command::Refresh {
                name,
                cb: step,
                ack: Some(ack_tx),
            },
        };
        if self.tx.send(cmd).is_err() {
            return false;
        }

        let Ok(expected) = ack_rx.await else {
            return false;
        };
        for _ in 0..expected {
            if done_rx.recv().await.is_none() {
                return false;
            }
        }
        true
    }
}

/// Signals one step completion on drop, so a panicking user callback still counts.
struct StepDone<'a>(&'a mpsc::UnboundedSender<()>);

impl Drop for StepDone<'_> {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}
