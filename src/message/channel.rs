use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use crate::error::{Error, Result};
use super::comm::Communicator;




/**
 * The communicator of a single process. Sending and receiving are never
 * needed by the collectives on a group of size one; if they are called
 * anyway the communicator reports itself disconnected.
 */
#[derive(Clone, Copy, Debug, Default)]
pub struct SelfCommunicator;

impl Communicator for SelfCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn send(&self, _rank: usize, _message: Vec<u8>) -> Result<()> {
        Err(Error::Disconnected { rank: 0 })
    }

    fn recv(&self) -> Result<Vec<u8>> {
        Err(Error::Disconnected { rank: 0 })
    }
}




/**
 * A communicator whose peers are threads of the same process, connected by
 * unbounded crossbeam channels. Each rank owns one inbox and holds a sender
 * into every peer's inbox, so `send` never blocks.
 */
pub struct ChannelCommunicator {
    rank: usize,
    peers: Vec<Sender<Vec<u8>>>,
    inbox: Receiver<Vec<u8>>,
}




// ============================================================================
impl ChannelCommunicator {

    /// Create a fully connected group of `size` communicators. Element `r`
    /// of the returned vector has rank `r`; each is meant to be moved into
    /// its own thread.
    pub fn group(size: usize) -> Vec<Self> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();

        debug!("create channel communicator group of size {}", size);

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| Self { rank, peers: senders.clone(), inbox })
            .collect()
    }
}

impl Communicator for ChannelCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, rank: usize, message: Vec<u8>) -> Result<()> {
        self.peers
            .get(rank)
            .ok_or(Error::Disconnected { rank: self.rank })?
            .send(message)
            .map_err(|_| Error::Disconnected { rank: self.rank })
    }

    fn recv(&self) -> Result<Vec<u8>> {
        self.inbox.recv().map_err(|_| Error::Disconnected { rank: self.rank })
    }
}
