//! # Commands sent from handles to the manager task.
//!
//! Every public [`Orchestrator`](crate::Orchestrator) call becomes one
//! [`Command`]. The channel is unbounded so callers never wait; the manager
//! handles commands strictly in send order.
//!
//! Commands carrying an `ack` or `reply` answer through a oneshot once the
//! command's synchronous portion is done.

use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};

use crate::slots::{Callback, SlotConfig, SlotId, SlotSnapshot};

use super::signal::EnvSignal;

pub(crate) type CommandTx = mpsc::UnboundedSender<Command>;
pub(crate) type CommandRx = mpsc::UnboundedReceiver<Command>;

/// Number of callbacks a render/refresh step registered or already fired.
pub(crate) type Ack = oneshot::Sender<usize>;

pub(crate) enum Command {
    /// Store or overwrite named defaults.
    Config { name: String, config: SlotConfig },
    /// Create a slot under `name` with a pre-allocated id.
    Queue {
        id: SlotId,
        name: String,
        overrides: SlotConfig,
    },
    /// Merge options into every live slot named `name`.
    Update { name: String, config: SlotConfig },
    Render {
        name: String,
        cb: Callback,
        ack: Option<Ack>,
    },
    Refresh {
        name: String,
        cb: Callback,
        ack: Option<Ack>,
    },
    /// Remember the ordering of a bulk render.
    BeginRenderAll { order: Vec<String> },
    /// Remember the ordering of a bulk refresh and mark slots for refresh.
    BeginRefreshAll { order: Vec<String> },
    /// Render every slot not yet active or resolved.
    RenderUntouched { cb: Callback },
    /// Refresh every slot still waiting for a refresh.
    RefreshUntouched { cb: Callback },
    Resolve { id: SlotId },
    Fail { id: SlotId, reason: String },
    ExtendInject { data: Map<String, Value> },
    Signal(EnvSignal),
    Slots {
        name: Option<String>,
        reply: oneshot::Sender<Vec<SlotSnapshot>>,
    },
    Slot {
        id: SlotId,
        reply: oneshot::Sender<Option<SlotSnapshot>>,
    },
}

impl Command {
    /// Short label for logs.
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            Command::Config { .. } => "config",
            Command::Queue { .. } => "queue",
            Command::Update { .. } => "update",
            Command::Render { .. } => "render",
            Command::Refresh { .. } => "refresh",
            Command::BeginRenderAll { .. } => "render_all",
            Command::BeginRefreshAll { .. } => "refresh_all",
            Command::RenderUntouched { .. } => "render_untouched",
            Command::RefreshUntouched { .. } => "refresh_untouched",
            Command::Resolve { .. } => "resolve",
            Command::Fail { .. } => "fail",
            Command::ExtendInject { .. } => "extend_inject",
            Command::Signal(_) => "signal",
            Command::Slots { .. } => "slots",
            Command::Slot { .. } => "slot",
        }
    }
}
