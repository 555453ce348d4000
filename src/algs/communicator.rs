//! Thin façade over in-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are contiguous byte slices tagged with a `u16`. The non-blocking
//! primitives return waitable handles; the blocking `send`, `recv` and
//! `send_recv` built on top of them are what the halo exchange uses.
//! `send_recv` posts its receive before its send, so two ranks swapping data
//! with each other cannot deadlock.

use crate::grid_error::GridError;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::{Arc, Barrier};

/// Largest tag every MPI implementation must accept.
pub const TAG_UB: u16 = 32767;

/// Tag carried by messages sent from `rank`.
#[inline]
pub fn rank_tag(rank: usize) -> u16 {
    (rank % (TAG_UB as usize + 1)) as u16
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Point-to-point and barrier interface of one rank.
pub trait Communicator: Send + Sync + 'static {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    /// Post a receive of `buf.len()` bytes; the data comes back from `wait`.
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Block until every rank of the communicator has entered the barrier.
    fn barrier(&self);

    /// Blocking send.
    fn send(&self, peer: usize, tag: u16, buf: &[u8]) -> Result<(), GridError> {
        self.isend(peer, tag, buf).wait();
        Ok(())
    }

    /// Blocking receive of exactly `buf.len()` bytes.
    fn recv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Result<(), GridError> {
        let data = self.irecv(peer, tag, buf).wait();
        fill_exact(peer, data, buf)
    }

    /// Send to `dest` and receive from `source` as one transaction.
    fn send_recv(
        &self,
        dest: usize,
        send_tag: u16,
        send: &[u8],
        source: usize,
        recv_tag: u16,
        recv: &mut [u8],
    ) -> Result<(), GridError> {
        let r = self.irecv(source, recv_tag, recv);
        let s = self.isend(dest, send_tag, send);
        s.wait();
        fill_exact(source, r.wait(), recv)
    }
}

/// Copy a completed receive into `buf`, checking its length.
pub(crate) fn fill_exact(peer: usize, data: Option<Vec<u8>>, buf: &mut [u8]) -> Result<(), GridError> {
    let data = data.ok_or_else(|| GridError::CommError {
        neighbor: peer,
        source: format!("no message arrived from rank {peer}").into(),
    })?;
    if data.len() != buf.len() {
        return Err(GridError::BufferSizeMismatch {
            neighbor: peer,
            expected: buf.len(),
            got: data.len(),
        });
    }
    buf.copy_from_slice(&data);
    Ok(())
}

/// Single-process communicator: rank 0 of 1, no peers.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}

    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}
}

// --- ThreadComm: several ranks as threads of one process ---
type Key = (usize, usize, u16); // (src, dst, tag)

struct Shared {
    mailbox: DashMap<Key, VecDeque<Bytes>>,
    lock: Mutex<()>,
    arrived: Condvar,
    barrier: Barrier,
}

/// In-process communicator; each rank is driven by its own thread.
///
/// All ranks created by one [`ThreadComm::world`] call share a mailbox and a
/// barrier and nothing else.
#[derive(Clone)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// One communicator per rank of an `n`-rank world.
    pub fn world(n: usize) -> Vec<ThreadComm> {
        let shared = Arc::new(Shared {
            mailbox: DashMap::new(),
            lock: Mutex::new(()),
            arrived: Condvar::new(),
            barrier: Barrier::new(n.max(1)),
        });
        (0..n)
            .map(|rank| ThreadComm {
                rank,
                size: n,
                shared: shared.clone(),
            })
            .collect()
    }
}

impl std::fmt::Debug for ThreadComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadComm")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}

pub struct ThreadRecvHandle {
    shared: Arc<Shared>,
    key: Key,
}

impl Wait for ThreadRecvHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let mut guard = self.shared.lock.lock();
        loop {
            let msg = self
                .shared
                .mailbox
                .get_mut(&self.key)
                .and_then(|mut q| q.pop_front());
            if let Some(bytes) = msg {
                return Some(bytes.to_vec());
            }
            self.shared.arrived.wait(&mut guard);
        }
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ();
    type RecvHandle = ThreadRecvHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
        let key = (self.rank, peer, tag);
        let data = Bytes::copy_from_slice(buf);
        let _guard = self.shared.lock.lock();
        self.shared.mailbox.entry(key).or_default().push_back(data);
        self.shared.arrived.notify_all();
    }

    fn irecv(&self, peer: usize, tag: u16, _buf: &mut [u8]) -> ThreadRecvHandle {
        ThreadRecvHandle {
            shared: self.shared.clone(),
            key: (peer, self.rank, tag),
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.shared.barrier.wait();
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, GridError, Wait};
    use mpi::point_to_point::send_receive_into_with_tags;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::Communicator as _;
    use mpi::traits::*;

    /// Communicator over `MPI_COMM_WORLD`.
    ///
    /// MPI must stay initialised for as long as the communicator is used; keep
    /// the `Universe` returned by [`MpiComm::init`] alive.
    #[derive(Clone, Debug)]
    pub struct MpiComm {
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        /// Initialise MPI and wrap the world communicator.
        pub fn init() -> Result<(mpi::environment::Universe, MpiComm), GridError> {
            let universe = mpi::initialize().ok_or_else(|| GridError::CommError {
                neighbor: 0,
                source: "MPI is already initialised".into(),
            })?;
            let comm = MpiComm::from_world();
            Ok((universe, comm))
        }

        /// Wrap the world communicator of an already initialised MPI.
        pub fn from_world() -> Self {
            let world = SimpleCommunicator::world();
            MpiComm {
                rank: world.rank() as usize,
                size: world.size() as usize,
            }
        }
    }

    /// Receive completed on `wait`.
    pub struct MpiRecvHandle {
        peer: usize,
        tag: u16,
        len: usize,
    }

    impl Wait for MpiRecvHandle {
        fn wait(self) -> Option<Vec<u8>> {
            let world = SimpleCommunicator::world();
            let mut buf = vec![0u8; self.len];
            let status = world
                .process_at_rank(self.peer as i32)
                .receive_into_with_tag(&mut buf[..], self.tag as i32);
            buf.truncate(status.count(u8::equivalent_datatype()) as usize);
            Some(buf)
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = ();
        type RecvHandle = MpiRecvHandle;

        /// Returns once `buf` may be reused (standard-mode send).
        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
            let world = SimpleCommunicator::world();
            world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, tag as i32);
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiRecvHandle {
            MpiRecvHandle {
                peer,
                tag,
                len: buf.len(),
            }
        }

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn barrier(&self) {
            SimpleCommunicator::world().barrier();
        }

        fn recv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Result<(), GridError> {
            let world = SimpleCommunicator::world();
            let status = world
                .process_at_rank(peer as i32)
                .receive_into_with_tag(buf, tag as i32);
            check_count(peer, buf.len(), status.count(u8::equivalent_datatype()))
        }

        fn send_recv(
            &self,
            dest: usize,
            send_tag: u16,
            send: &[u8],
            source: usize,
            recv_tag: u16,
            recv: &mut [u8],
        ) -> Result<(), GridError> {
            let world = SimpleCommunicator::world();
            let status = send_receive_into_with_tags(
                send,
                &world.process_at_rank(dest as i32),
                send_tag as i32,
                recv,
                &world.process_at_rank(source as i32),
                recv_tag as i32,
            );
            check_count(source, recv.len(), status.count(u8::equivalent_datatype()))
        }
    }

    fn check_count(peer: usize, expected: usize, got: mpi::Count) -> Result<(), GridError> {
        if got as usize == expected {
            Ok(())
        } else {
            Err(GridError::BufferSizeMismatch {
                neighbor: peer,
                expected,
                got: got as usize,
            })
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
