//! Switch-control API used by the installer and the ARP proxy.
//!
//! Calls on a [`SwitchChannel`] are fire-and-forget: they return before the
//! message is on the wire, carry no acknowledgement, and the switch may apply
//! several of them in any order. Nothing here waits for confirmation.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::trace;

use crate::net::{ETH_TYPE_IPV4, PortNo, SwitchId};

/// Match fields of a flow rule. `None` is a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowMatch {
    pub eth_type: Option<u16>,
    pub ipv4_src: Option<Ipv4Addr>,
    pub ipv4_dst: Option<Ipv4Addr>,
}

impl FlowMatch {
    /// Matches every packet (table-miss).
    pub const fn any() -> Self {
        Self {
            eth_type: None,
            ipv4_src: None,
            ipv4_dst: None,
        }
    }

    /// IPv4 traffic from `src` to `dst`.
    pub const fn ipv4(src: Ipv4Addr, dst: Ipv4Addr) -> Self {
        Self {
            eth_type: Some(ETH_TYPE_IPV4),
            ipv4_src: Some(src),
            ipv4_dst: Some(dst),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "port", rename_all = "snake_case")]
pub enum FlowAction {
    Output(PortNo),
    /// Punt to the controller as a packet-in.
    Controller,
}

/// A flow-mod: install (or overwrite) one rule in the single flow table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowMod {
    pub priority: u16,
    #[serde(rename = "match")]
    pub matches: FlowMatch,
    pub action: FlowAction,
}

/// Control channel of one connected switch.
pub trait SwitchChannel: Send + Sync {
    fn install_flow(&self, flow: FlowMod);
    fn send_packet_out(&self, out_port: PortNo, frame: Vec<u8>);
}

/// Resolves switch ids to live control channels.
///
/// Injected into the controller so tests and replays can substitute a fake.
pub trait SwitchRegistry: Send + Sync {
    fn channel(&self, id: SwitchId) -> Option<Arc<dyn SwitchChannel>>;
}

/// One command issued to a switch, as captured by [`RecordingRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwitchCommand {
    FlowMod { switch: SwitchId, flow: FlowMod },
    PacketOut {
        switch: SwitchId,
        out_port: PortNo,
        #[serde(skip)]
        frame: Vec<u8>,
        frame_len: usize,
    },
}

impl SwitchCommand {
    pub fn switch(&self) -> SwitchId {
        match self {
            SwitchCommand::FlowMod { switch, .. } | SwitchCommand::PacketOut { switch, .. } => {
                *switch
            }
        }
    }
}

type CommandLog = Arc<Mutex<Vec<SwitchCommand>>>;

/// Channel that appends every command to a shared log instead of a socket.
#[derive(Debug)]
struct RecordingChannel {
    switch: SwitchId,
    log: CommandLog,
}

impl RecordingChannel {
    fn push(&self, cmd: SwitchCommand) {
        trace!(switch = %self.switch, ?cmd, "记录交换机命令");
        self.log.lock().unwrap_or_else(PoisonError::into_inner).push(cmd);
    }
}

impl SwitchChannel for RecordingChannel {
    fn install_flow(&self, flow: FlowMod) {
        self.push(SwitchCommand::FlowMod {
            switch: self.switch,
            flow,
        });
    }

    fn send_packet_out(&self, out_port: PortNo, frame: Vec<u8>) {
        self.push(SwitchCommand::PacketOut {
            switch: self.switch,
            out_port,
            frame_len: frame.len(),
            frame,
        });
    }
}

/// In-memory registry whose switches record what they were told to do.
///
/// Stands in for the switch-control layer in replays and tests.
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    channels: Mutex<BTreeMap<SwitchId, Arc<RecordingChannel>>>,
    log: CommandLog,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `id` reachable. Idempotent.
    pub fn connect(&self, id: SwitchId) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.entry(id).or_insert_with(|| {
            Arc::new(RecordingChannel {
                switch: id,
                log: Arc::clone(&self.log),
            })
        });
    }

    /// Drop the channel for `id`; later lookups fail.
    pub fn disconnect(&self, id: SwitchId) {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// Every command issued so far, in issue order.
    pub fn commands(&self) -> Vec<SwitchCommand> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Remove and return the commands issued so far.
    pub fn drain(&self) -> Vec<SwitchCommand> {
        std::mem::take(&mut *self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl SwitchRegistry for RecordingRegistry {
    fn channel(&self, id: SwitchId) -> Option<Arc<dyn SwitchChannel>> {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(&id)
            .map(|ch| Arc::clone(ch) as Arc<dyn SwitchChannel>)
    }
}
