use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Barrier};

use tracing::{info, instrument, trace};

use crate::communication::{check_rank, ProcessGroup};
use crate::error::{GreeterError, Result};

/// Group of a single process. There is nobody to talk to, so every send or receive fails.
pub struct DummyProcessGroup();

impl ProcessGroup for DummyProcessGroup {
    fn rank(&self) -> u32 {
        0
    }

    fn size(&self) -> u32 {
        1
    }

    fn send(&self, to: u32, _tag: i32, _payload: &[u8]) -> Result<()> {
        Err(GreeterError::RankOutOfRange { rank: to, size: 1 })
    }

    fn receive(&self, from: u32, _tag: i32) -> Result<Vec<u8>> {
        Err(GreeterError::RankOutOfRange {
            rank: from,
            size: 1,
        })
    }

    fn barrier(&self) {
        info!("Barrier was called on DummyProcessGroup, which doesn't do anything.")
    }
}

struct Envelope {
    tag: i32,
    payload: Vec<u8>,
}

/// In-process group where each rank lives on its own thread. Every ordered pair of ranks gets a
/// dedicated channel, so receiving from a specific rank never has to look at other senders.
pub struct ChannelProcessGroup {
    rank: u32,
    // indexed by target rank
    senders: Vec<Sender<Envelope>>,
    // indexed by source rank
    receivers: Vec<Receiver<Envelope>>,
    // messages from a source which arrived while we were waiting for another tag
    pending: RefCell<Vec<VecDeque<Envelope>>>,
    barrier: Arc<Barrier>,
}

impl ChannelProcessGroup {
    pub fn create_n_2_n(num_parts: u32) -> Vec<ChannelProcessGroup> {
        let n = num_parts as usize;
        let mut senders: Vec<Vec<Sender<Envelope>>> = (0..n).map(|_| Vec::new()).collect();
        let mut receivers: Vec<Vec<Receiver<Envelope>>> = (0..n).map(|_| Vec::new()).collect();
        let barrier = Arc::new(Barrier::new(n));

        for from in 0..n {
            for to_receivers in receivers.iter_mut() {
                let (sender, receiver) = channel();
                senders[from].push(sender);
                to_receivers.push(receiver);
            }
        }

        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (senders, receivers))| ChannelProcessGroup {
                rank: rank as u32,
                senders,
                receivers,
                pending: RefCell::new((0..n).map(|_| VecDeque::new()).collect()),
                barrier: barrier.clone(),
            })
            .collect()
    }

    fn take_pending(&self, from: u32, tag: i32) -> Option<Envelope> {
        let mut pending = self.pending.borrow_mut();
        let queue = &mut pending[from as usize];
        let index = queue.iter().position(|e| e.tag == tag)?;
        queue.remove(index)
    }
}

impl ProcessGroup for ChannelProcessGroup {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn size(&self) -> u32 {
        self.senders.len() as u32
    }

    #[instrument(level = "trace", skip(self, payload), fields(rank = self.rank))]
    fn send(&self, to: u32, tag: i32, payload: &[u8]) -> Result<()> {
        check_rank(to, self.size())?;
        self.senders[to as usize]
            .send(Envelope {
                tag,
                payload: payload.to_vec(),
            })
            .map_err(|_| GreeterError::Disconnected { peer: to })
    }

    #[instrument(level = "trace", skip(self), fields(rank = self.rank))]
    fn receive(&self, from: u32, tag: i32) -> Result<Vec<u8>> {
        check_rank(from, self.size())?;
        if let Some(envelope) = self.take_pending(from, tag) {
            return Ok(envelope.payload);
        }

        loop {
            let envelope = self.receivers[from as usize]
                .recv()
                .map_err(|_| GreeterError::Disconnected { peer: from })?;
            if envelope.tag == tag {
                return Ok(envelope.payload);
            }
            trace!(
                "Keeping message with tag {} from #{from} until it is asked for.",
                envelope.tag
            );
            self.pending.borrow_mut()[from as usize].push_back(envelope);
        }
    }

    fn barrier(&self) {
        self.barrier.wait();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::communication::local_communicator::{ChannelProcessGroup, DummyProcessGroup};
    use crate::communication::ProcessGroup;
    use crate::error::GreeterError;

    #[test]
    fn create_n_2_n_assigns_ranks() {
        let comms = ChannelProcessGroup::create_n_2_n(3);
        let ranks: Vec<_> = comms.iter().map(|c| c.rank()).collect();
        assert_eq!(vec![0, 1, 2], ranks);
        assert!(comms.iter().all(|c| c.size() == 3));
        assert!(comms[0].is_coordinator());
        assert!(!comms[1].is_coordinator());
    }

    #[test]
    fn receive_from_specific_rank() {
        let comms = ChannelProcessGroup::create_n_2_n(3);
        comms[2].send(0, 0, b"from two").unwrap();
        comms[1].send(0, 0, b"from one").unwrap();

        assert_eq!(b"from one".to_vec(), comms[0].receive(1, 0).unwrap());
        assert_eq!(b"from two".to_vec(), comms[0].receive(2, 0).unwrap());
    }

    #[test]
    fn receive_matches_tag() {
        let comms = ChannelProcessGroup::create_n_2_n(2);
        comms[1].send(0, 7, b"seven").unwrap();
        comms[1].send(0, 0, b"zero").unwrap();

        assert_eq!(b"zero".to_vec(), comms[0].receive(1, 0).unwrap());
        assert_eq!(b"seven".to_vec(), comms[0].receive(1, 7).unwrap());
    }

    #[test]
    fn messages_keep_order_per_pair() {
        let comms = ChannelProcessGroup::create_n_2_n(2);
        comms[1].send(0, 0, b"first").unwrap();
        comms[1].send(0, 0, b"second").unwrap();

        assert_eq!(b"first".to_vec(), comms[0].receive(1, 0).unwrap());
        assert_eq!(b"second".to_vec(), comms[0].receive(1, 0).unwrap());
    }

    #[test]
    fn rank_out_of_range() {
        let comms = ChannelProcessGroup::create_n_2_n(2);
        assert!(matches!(
            comms[0].send(2, 0, b"nobody"),
            Err(GreeterError::RankOutOfRange { rank: 2, size: 2 })
        ));
        assert!(matches!(
            comms[0].receive(5, 0),
            Err(GreeterError::RankOutOfRange { rank: 5, size: 2 })
        ));
    }

    #[test]
    fn dropped_peer_is_reported() {
        let mut comms = ChannelProcessGroup::create_n_2_n(2);
        let other = comms.pop().unwrap();
        drop(other);

        assert!(matches!(
            comms[0].receive(1, 0),
            Err(GreeterError::Disconnected { peer: 1 })
        ));
        assert!(matches!(
            comms[0].send(1, 0, b"hello?"),
            Err(GreeterError::Disconnected { peer: 1 })
        ));
    }

    #[test]
    fn barrier_across_threads() {
        let handles: Vec<_> = ChannelProcessGroup::create_n_2_n(4)
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    comm.barrier();
                    comm.rank()
                })
            })
            .collect();

        let mut ranks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ranks.sort();
        assert_eq!(vec![0, 1, 2, 3], ranks);
    }

    #[test]
    fn dummy_is_single_coordinator() {
        let comm = DummyProcessGroup();
        assert_eq!(0, comm.rank());
        assert_eq!(1, comm.size());
        assert!(comm.is_coordinator());
        assert!(comm.send(0, 0, b"").is_err());
        assert!(comm.receive(0, 0).is_err());
    }
}
