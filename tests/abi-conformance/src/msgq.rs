//! Message queues for the simulated kernel.
//!
//! The simulation is single-threaded, so a call that would block can
//! never be satisfied. It returns `Interrupted` as if a signal had woken
//! the waiter.

use std::collections::{BTreeMap, VecDeque};

use kestrel_abi::flags::MsgFlags;
use kestrel_abi::wire::MsgKey;
use kestrel_abi::{Error, SysResult};

/// Matches any message type on read.
pub const ANY_TYPE: u64 = 0;

#[derive(Debug)]
struct Queue {
    slots: usize,
    max_bytes: usize,
    messages: VecDeque<(u64, Vec<u8>)>,
}

#[derive(Debug, Default)]
pub struct Queues {
    queues: BTreeMap<u64, Queue>,
    next_key: u64,
}

impl Queues {
    pub fn create(&mut self, slots: u64, max_bytes: u64) -> SysResult<MsgKey> {
        if slots == 0 || max_bytes == 0 {
            return Err(Error::Param);
        }
        self.next_key += 1;
        let key = self.next_key;
        self.queues.insert(
            key,
            Queue {
                slots: slots as usize,
                max_bytes: max_bytes as usize,
                messages: VecDeque::new(),
            },
        );
        Ok(MsgKey(key))
    }

    fn queue(&mut self, key: MsgKey) -> SysResult<&mut Queue> {
        self.queues.get_mut(&key.raw()).ok_or(Error::Param)
    }

    pub fn write(&mut self, key: MsgKey, msg_type: u64, data: &[u8], flags: MsgFlags) -> SysResult<()> {
        let queue = self.queue(key)?;
        if data.len() > queue.max_bytes {
            return Err(Error::Size);
        }
        if queue.messages.len() >= queue.slots {
            return Err(if flags.contains(MsgFlags::NO_BLOCK) {
                Error::Busy
            } else {
                Error::Interrupted
            });
        }
        queue.messages.push_back((msg_type, data.to_vec()));
        Ok(())
    }

    /// Dequeue the first message of `msg_type` into `buf`.
    pub fn read(&mut self, key: MsgKey, msg_type: u64, buf: &mut [u8], flags: MsgFlags) -> SysResult<usize> {
        let queue = self.queue(key)?;
        let found = queue
            .messages
            .iter()
            .position(|(ty, _)| msg_type == ANY_TYPE || *ty == msg_type);

        let Some(index) = found else {
            let others_queued = !queue.messages.is_empty();
            return Err(if others_queued && flags.contains(MsgFlags::NO_BLOCK_OTHER_TYPE) {
                Error::Continue
            } else if flags.contains(MsgFlags::NO_BLOCK) {
                Error::Busy
            } else {
                Error::Interrupted
            });
        };

        if queue.messages[index].1.len() > buf.len() {
            return Err(Error::Buffer);
        }
        let (_, data) = queue.messages.remove(index).ok_or(Error::Internal)?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    pub fn close(&mut self, key: MsgKey) -> SysResult<()> {
        self.queues.remove(&key.raw()).map(|_| ()).ok_or(Error::Param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_within_type() {
        let mut queues = Queues::default();
        let key = queues.create(4, 16).unwrap();
        queues.write(key, 1, b"a", MsgFlags::NO_BLOCK).unwrap();
        queues.write(key, 2, b"b", MsgFlags::NO_BLOCK).unwrap();
        queues.write(key, 1, b"c", MsgFlags::NO_BLOCK).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(queues.read(key, 2, &mut buf, MsgFlags::NO_BLOCK), Ok(1));
        assert_eq!(buf[0], b'b');
        assert_eq!(queues.read(key, 1, &mut buf, MsgFlags::NO_BLOCK), Ok(1));
        assert_eq!(buf[0], b'a');
        assert_eq!(queues.read(key, ANY_TYPE, &mut buf, MsgFlags::NO_BLOCK), Ok(1));
        assert_eq!(buf[0], b'c');
    }

    #[test]
    fn test_other_type_rule() {
        let mut queues = Queues::default();
        let key = queues.create(2, 8).unwrap();
        queues.write(key, 7, b"x", MsgFlags::empty()).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(
            queues.read(key, 3, &mut buf, MsgFlags::NO_BLOCK_OTHER_TYPE),
            Err(Error::Continue)
        );
        assert_eq!(
            queues.read(key, 3, &mut buf, MsgFlags::NO_BLOCK | MsgFlags::NO_BLOCK_OTHER_TYPE),
            Err(Error::Continue)
        );
        queues.read(key, 7, &mut buf, MsgFlags::empty()).unwrap();
        assert_eq!(
            queues.read(key, 3, &mut buf, MsgFlags::NO_BLOCK_OTHER_TYPE),
            Err(Error::Interrupted)
        );
        assert_eq!(queues.read(key, 3, &mut buf, MsgFlags::NO_BLOCK), Err(Error::Busy));
    }

    #[test]
    fn test_oversized_and_closed() {
        let mut queues = Queues::default();
        let key = queues.create(1, 4).unwrap();
        assert_eq!(queues.write(key, 1, b"12345", MsgFlags::NO_BLOCK), Err(Error::Size));
        queues.close(key).unwrap();
        assert_eq!(queues.write(key, 1, b"1", MsgFlags::NO_BLOCK), Err(Error::Param));
    }
}
