//! Compact ID allocator.
//!
//! Hands out the smallest free integer ID (or the lowest contiguous range of IDs) from
//! `0..=max_id` and recycles IDs on destruction. Free IDs are kept as a sorted list of disjoint
//! inclusive ranges; adjacent ranges are merged on release, so the list stays short as long
//! as allocations are roughly LIFO.
//!
//! Used to give pipeline states and vertex arrays small dense identifiers.

use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct FreeRange {
    first: u32,
    last: u32,
}

impl FreeRange {
    /// Wider than an ID: `0..=u32::MAX` holds 2^32 IDs.
    fn len(&self) -> u64 {
        u64::from(self.last) - u64::from(self.first) + 1
    }
}

pub struct MakeId {
    free: Vec<FreeRange>,
    max_id: u32,
}

impl MakeId {
    /// Creates an allocator where every ID in `0..=max_id` is available.
    pub fn new(max_id: u32) -> MakeId {
        MakeId {
            free: vec![FreeRange {
                first: 0,
                last: max_id,
            }],
            max_id,
        }
    }

    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Allocates the smallest available ID.
    pub fn create_id(&mut self) -> Option<u32> {
        let range = self.free.first_mut()?;
        let id = range.first;
        if range.first == range.last {
            self.free.remove(0);
        } else {
            range.first += 1;
        }
        Some(id)
    }

    /// Allocates `count` contiguous IDs and returns the first one.
    ///
    /// The range with the lowest start that is large enough is used.
    pub fn create_range_id(&mut self, count: u32) -> Option<u32> {
        if count == 0 {
            return None;
        }
        let i = self.free.iter().position(|r| r.len() >= u64::from(count))?;
        let range = &mut self.free[i];
        let id = range.first;
        if range.len() == u64::from(count) {
            self.free.remove(i);
        } else {
            range.first += count;
        }
        Some(id)
    }

    /// Returns an ID to the allocator. Returns false if the ID was not allocated.
    pub fn destroy_id(&mut self, id: u32) -> bool {
        self.destroy_range(id, 1)
    }

    /// Returns `count` contiguous IDs starting at `id` to the allocator.
    ///
    /// Returns false (and changes nothing) if any ID of the range is out of bounds or
    /// already free.
    pub fn destroy_range(&mut self, id: u32, count: u32) -> bool {
        if count == 0 {
            return false;
        }
        let last = match id.checked_add(count - 1) {
            Some(last) if last <= self.max_id => last,
            _ => return false,
        };

        // index of the first free range starting after `id`
        let i = self.free.partition_point(|r| r.first <= id);

        if i > 0 && self.free[i - 1].last >= id {
            return false;
        }
        if i < self.free.len() && self.free[i].first <= last {
            return false;
        }

        let merge_prev = i > 0 && self.free[i - 1].last + 1 == id;
        let merge_next = i < self.free.len() && last + 1 == self.free[i].first;

        match (merge_prev, merge_next) {
            (true, true) => {
                self.free[i - 1].last = self.free[i].last;
                self.free.remove(i);
            }
            (true, false) => self.free[i - 1].last = last,
            (false, true) => self.free[i].first = id,
            (false, false) => self.free.insert(i, FreeRange { first: id, last }),
        }
        true
    }

    /// Returns true if the ID is currently allocated.
    pub fn is_id(&self, id: u32) -> bool {
        id <= self.max_id && !self.free.iter().any(|r| r.first <= id && id <= r.last)
    }

    pub fn available_ids(&self) -> u64 {
        self.free.iter().map(FreeRange::len).sum()
    }

    pub fn largest_continuous_range(&self) -> u64 {
        self.free.iter().map(FreeRange::len).max().unwrap_or(0)
    }
}

impl fmt::Debug for MakeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MakeId {{ max_id: {}, free: [", self.max_id)?;
        for (i, r) in self.free.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if r.first == r.last {
                write!(f, "{}", r.first)?;
            } else {
                write!(f, "{}-{}", r.first, r.last)?;
            }
        }
        write!(f, "] }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn smallest_id_is_reused() {
        let mut ids = MakeId::new(65535);
        assert_eq!(ids.create_id(), Some(0));
        assert_eq!(ids.create_id(), Some(1));
        assert_eq!(ids.create_id(), Some(2));
        assert!(ids.destroy_id(1));
        assert_eq!(ids.create_id(), Some(1));
        assert_eq!(ids.create_id(), Some(3));
    }

    #[test]
    fn double_free_is_rejected() {
        let mut ids = MakeId::new(16);
        let a = ids.create_id().unwrap();
        assert!(ids.destroy_id(a));
        assert!(!ids.destroy_id(a));
        assert!(!ids.destroy_id(17));
        assert_eq!(ids.available_ids(), 17);
    }

    #[test]
    fn exhaustion() {
        let mut ids = MakeId::new(2);
        assert_eq!(ids.create_id(), Some(0));
        assert_eq!(ids.create_id(), Some(1));
        assert_eq!(ids.create_id(), Some(2));
        assert_eq!(ids.create_id(), None);
        assert!(ids.destroy_id(2));
        assert_eq!(ids.create_id(), Some(2));
    }

    #[test]
    fn ranges_merge_back() {
        let mut ids = MakeId::new(99);
        let a = ids.create_range_id(10).unwrap();
        let b = ids.create_range_id(10).unwrap();
        let c = ids.create_range_id(10).unwrap();
        assert_eq!((a, b, c), (0, 10, 20));
        assert!(ids.destroy_range(a, 10));
        assert!(ids.destroy_range(c, 10));
        // [0..9] and [20..99] free, 10 IDs of `b` still live
        assert_eq!(ids.largest_continuous_range(), 80);
        assert_eq!(ids.create_range_id(15), Some(20));
        assert!(ids.destroy_range(20, 15));
        assert!(ids.destroy_range(b, 10));
        assert_eq!(ids.largest_continuous_range(), 100);
        assert_eq!(ids.available_ids(), 100);
    }

    #[test]
    fn overlapping_range_release_is_rejected() {
        let mut ids = MakeId::new(31);
        let a = ids.create_range_id(8).unwrap();
        assert!(ids.destroy_range(a + 4, 4));
        assert!(!ids.destroy_range(a, 8));
        assert!(ids.destroy_range(a, 4));
        assert!(!ids.is_id(a));
    }

    #[test]
    fn full_id_space() {
        let mut ids = MakeId::new(u32::MAX);
        assert_eq!(ids.available_ids(), 1 << 32);
        assert_eq!(ids.largest_continuous_range(), 1 << 32);
        assert_eq!(ids.create_range_id(u32::MAX), Some(0));
        assert_eq!(ids.available_ids(), 1);
        assert_eq!(ids.create_id(), Some(u32::MAX));
        assert_eq!(ids.available_ids(), 0);
        assert_eq!(ids.create_id(), None);
        assert!(ids.destroy_id(u32::MAX));
        assert!(ids.destroy_range(0, u32::MAX));
        assert_eq!(ids.available_ids(), 1 << 32);
    }

    #[test]
    fn live_set_matches_model() {
        // deterministic pseudo-random allocate/free sequence checked against a set model
        let mut ids = MakeId::new(255);
        let mut live = BTreeSet::new();
        let mut seed = 0x2545_f491_u32;
        for _ in 0..4000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            if seed % 3 != 0 || live.is_empty() {
                if let Some(id) = ids.create_id() {
                    let smallest_free = (0..=255).find(|i| !live.contains(i)).unwrap();
                    assert_eq!(id, smallest_free);
                    assert!(live.insert(id), "live id {} handed out twice", id);
                } else {
                    assert_eq!(live.len(), 256);
                }
            } else {
                let victim = *live.iter().nth(seed as usize % live.len()).unwrap();
                live.remove(&victim);
                assert!(ids.destroy_id(victim));
            }
            assert_eq!(ids.available_ids() as usize, 256 - live.len());
        }
        for id in 0..=255 {
            assert_eq!(ids.is_id(id), live.contains(&id));
        }
    }
}
