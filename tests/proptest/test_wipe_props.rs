//! Property-based tests for zero-filling

use evap::eraser::{wipe_then_unlink, zero_fill, WipeTarget};
use evap::error::WipeStage;
use proptest::prelude::*;
use std::cell::Cell;
use std::io::{self, ErrorKind, Write};
use std::rc::Rc;

/// Accepts at most `max_write` bytes per call and is interrupted every
/// `interrupt_every` calls
struct ChoppyTarget {
    max_write: usize,
    interrupt_every: usize,
    calls: usize,
    zeros: u64,
    synced: Rc<Cell<bool>>,
}

impl Write for ChoppyTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.interrupt_every > 0 && self.calls % self.interrupt_every == 0 {
            return Err(io::Error::new(ErrorKind::Interrupted, "EINTR"));
        }
        assert!(buf.iter().all(|&b| b == 0));
        let n = buf.len().min(self.max_write);
        self.zeros += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WipeTarget for ChoppyTarget {
    fn sync_to_disk(&mut self) -> io::Result<()> {
        self.synced.set(true);
        Ok(())
    }
}

fn target(max_write: usize, interrupt_every: usize) -> ChoppyTarget {
    ChoppyTarget {
        max_write,
        interrupt_every,
        calls: 0,
        zeros: 0,
        synced: Rc::new(Cell::new(false)),
    }
}

proptest! {
    #[test]
    fn test_exact_length_is_zeroed(
        len in 0u64..50000,
        max_write in 1usize..9000,
        interrupt_every in 0usize..5,
    ) {
        // interrupt_every == 1 would never make progress
        prop_assume!(interrupt_every != 1);
        let mut t = target(max_write, interrupt_every);

        prop_assert_eq!(zero_fill(&mut t, len).unwrap(), len);
        prop_assert_eq!(t.zeros, len);
    }

    #[test]
    fn test_unlink_only_after_sync(len in 0u64..20000) {
        let mut t = target(usize::MAX, 0);
        let synced = t.synced.clone();
        let mut synced_at_unlink = None;

        let result = wipe_then_unlink(&mut t, len, || {
            synced_at_unlink = Some(synced.get());
            Ok(())
        });

        prop_assert!(result.is_ok());
        prop_assert_eq!(synced_at_unlink, Some(true));
    }

    #[test]
    fn test_failed_unlink_reports_stage(len in 0u64..5000) {
        let mut t = target(usize::MAX, 0);
        let err = wipe_then_unlink(&mut t, len, || Err(io::Error::from(ErrorKind::PermissionDenied)))
            .unwrap_err();

        prop_assert_eq!(err.0, WipeStage::Unlink);
        prop_assert!(t.synced.get());
    }
}
