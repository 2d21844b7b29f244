//! A bounded queue of outbound packets.
//!
//! Producers never wait. A packet that does not fit is handed back and may be dropped, which is
//! how a congested link behaves. The consumer on the other hand may block until a packet arrives
//! or every producer is gone.
//!
//! Elements travel through a `crossbeam_channel`. The bound is enforced by reserving a slot
//! before sending and releasing it after receiving, so the channel itself only allocates for
//! what is actually queued and a zero bound rejects everything.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

/// The sending half of a queue.
///
/// Any number of threads may push through a shared reference. Dropping it closes the queue.
pub struct Producer<T> {
    sender: Sender<T>,
    slots: Arc<Slots>,
}

/// The receiving half of a queue.
///
/// There is usually a single consumer, several of them only contend for the same elements.
pub struct Consumer<T> {
    receiver: Receiver<T>,
    slots: Arc<Slots>,
}

/// Occupancy shared by both halves.
///
/// `occupied` is never below the number of elements in the channel.
struct Slots {
    occupied: AtomicUsize,
    capacity: usize,
}

/// The reason a non-blocking pop did not return an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TryPopError {
    /// There is no element right now but there may be later.
    Empty,
    /// The producer was dropped and no elements remain.
    Closed,
}

/// Create a queue holding at most `capacity` elements.
pub fn bounded<T>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    let (sender, receiver) = unbounded();
    let slots = Arc::new(Slots {
        occupied: AtomicUsize::new(0),
        capacity,
    });

    let producer = Producer { sender, slots: Arc::clone(&slots) };
    let consumer = Consumer { receiver, slots };
    (producer, consumer)
}

impl<T> Producer<T> {
    /// Append an element unless the queue is full.
    ///
    /// Returns the element if it was not accepted.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        if !self.slots.reserve() {
            return Err(item);
        }

        self.sender.send(item).map_err(|err| {
            self.slots.release();
            err.into_inner()
        })
    }
}

impl<T> Consumer<T> {
    /// Remove the oldest element, waiting for one if necessary.
    ///
    /// Returns `None` only once the producer was dropped and every element was removed.
    pub fn pop(&self) -> Option<T> {
        let item = self.receiver.recv().ok()?;
        self.slots.release();
        Some(item)
    }

    /// Remove the oldest element if there is one.
    pub fn try_pop(&self) -> Result<T, TryPopError> {
        match self.receiver.try_recv() {
            Ok(item) => {
                self.slots.release();
                Ok(item)
            },
            Err(TryRecvError::Empty) => Err(TryPopError::Empty),
            Err(TryRecvError::Disconnected) => Err(TryPopError::Closed),
        }
    }

    /// Discard all queued elements, returning how many there were.
    pub fn drain(&self) -> usize {
        let mut count = 0;
        while self.try_pop().is_ok() {
            count += 1;
        }
        count
    }

    /// The number of queued elements.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether no element is queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// The maximum number of queued elements.
    pub fn capacity(&self) -> usize {
        self.slots.capacity
    }
}

impl Slots {
    fn reserve(&self) -> bool {
        let capacity = self.capacity;
        self.occupied
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |occupied| {
                if occupied < capacity { Some(occupied + 1) } else { None }
            })
            .is_ok()
    }

    fn release(&self) {
        self.occupied.fetch_sub(1, Ordering::AcqRel);
    }
}
