#![allow(dead_code)]
use parallel_grid::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Run `f` once per rank of an `n`-rank in-process world, one thread per
/// rank, and collect the results in rank order.
pub fn run_ranks<R: Send>(n: usize, f: impl Fn(ThreadComm) -> R + Sync) -> Vec<R> {
    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = ThreadComm::world(n)
            .into_iter()
            .map(|c| s.spawn(move || f(c)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

/// Distinct, non-zero base value of a global cell.
pub fn stamp(g: &Coord) -> f64 {
    (g.x() * 10_000 + g.y() * 100 + g.z() + 1) as f64
}

/// Levels of a stamped cell: current, previous, previous-previous.
pub fn stamped_levels(g: &Coord, levels: TimeLevels) -> Vec<f64> {
    let s = stamp(g);
    [s, s + 0.5, s + 0.25][..levels.count()].to_vec()
}

/// Write the stamp of every owned cell; halo cells stay zero.
pub fn stamp_owned<C: Communicator>(pg: &mut ParallelGrid<f64, C>) {
    let levels = pg.config().time_levels;
    let size = pg.extended_size().unwrap();
    let n = size.volume();
    for i in 0..n {
        let local = pg.grid().unwrap().coord_of(i).unwrap();
        if !is_interior(&local, pg) {
            continue;
        }
        let global = pg.to_global(&local).unwrap().expect("owned cell is global");
        assert!(pg.is_owned(&global));
        let v = FieldPointValue::from_levels(&stamped_levels(&global, levels)).unwrap();
        pg.set(&local, v).unwrap();
    }
}

fn is_interior<C: Communicator>(local: &Coord, pg: &ParallelGrid<f64, C>) -> bool {
    let halo = pg.config().halo();
    let owned = pg.owned_size().unwrap();
    (0..local.rank()).all(|a| local.get(a) >= halo.get(a) && local.get(a) < halo.get(a) + owned.get(a))
}

/// After a share: every cell with a global counterpart holds that cell's
/// stamp, every other halo cell is still zero.
pub fn assert_halo_consistent<C: Communicator>(pg: &ParallelGrid<f64, C>) {
    let levels = pg.config().time_levels;
    let grid = pg.grid().unwrap();
    for (i, cell) in grid.iter() {
        let local = grid.coord_of(i).unwrap();
        match pg.to_global(&local).unwrap() {
            Some(g) => assert_eq!(
                cell.as_slice(),
                stamped_levels(&g, levels).as_slice(),
                "rank {} local {local} global {g}",
                pg.comm().rank()
            ),
            None => assert!(
                cell.as_slice().iter().all(|v| *v == 0.0),
                "rank {} boundary halo {local} was written",
                pg.comm().rank()
            ),
        }
    }
}

/// Communicator wrapper that counts transport calls.
#[derive(Debug)]
pub struct CountingComm<C> {
    pub inner: C,
    pub sends: AtomicUsize,
    pub recvs: AtomicUsize,
    pub send_recvs: AtomicUsize,
    pub barriers: AtomicUsize,
}

impl<C> CountingComm<C> {
    pub fn new(inner: C) -> Self {
        CountingComm {
            inner,
            sends: AtomicUsize::new(0),
            recvs: AtomicUsize::new(0),
            send_recvs: AtomicUsize::new(0),
            barriers: AtomicUsize::new(0),
        }
    }

    pub fn transport_calls(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
            + self.recvs.load(Ordering::SeqCst)
            + self.send_recvs.load(Ordering::SeqCst)
    }
}

impl<C: Communicator> Communicator for CountingComm<C> {
    type SendHandle = C::SendHandle;
    type RecvHandle = C::RecvHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        self.inner.isend(peer, tag, buf)
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle {
        self.inner.irecv(peer, tag, buf)
    }

    fn rank(&self) -> usize {
        self.inner.rank()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn barrier(&self) {
        self.barriers.fetch_add(1, Ordering::SeqCst);
        self.inner.barrier();
    }

    fn send(&self, peer: usize, tag: u16, buf: &[u8]) -> Result<(), GridError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.inner.send(peer, tag, buf)
    }

    fn recv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Result<(), GridError> {
        self.recvs.fetch_add(1, Ordering::SeqCst);
        self.inner.recv(peer, tag, buf)
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
        self.send_recvs.fetch_add(1, Ordering::SeqCst);
        self.inner.send_recv(dest, send_tag, send, source, recv_tag, recv)
    }
}
