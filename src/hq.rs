//! Hierarchical queue: an array of FIFO buckets indexed by pixel priority.
//!
//! Two layouts share one implementation:
//!
//! - **Narrow** (8-bit keys): 256 buckets, walked in ascending key order.
//! - **Wide** (32-bit keys): 65536 current-range buckets indexed by the low
//!   16 bits of the key, plus a parallel array of 65536 over-lists indexed
//!   by the high 16 bits. Only one 16-bit window of keys is bucketed at a
//!   time; keys outside it wait in their over-list. When the current window
//!   is exhausted the queue advances to the next populated over-list and
//!   re-buckets every position in it by the low 16 bits of its *current*
//!   key, read back through a caller-supplied lookup (pixel values may have
//!   changed since the position was first queued).
//!
//! Insertion clamps the key to the current water level so progress is
//! monotone, and buckets are FIFO so earlier seeds win ties at one level.
//!
//! The queue only walks upward. A flood that needs descending pixel order
//! (reconstruction by dilation) feeds complemented keys; the complement
//! preserves the 16-bit window split and the FIFO tie order.

use crate::arena::{BucketList, TokenArena};

const RANGE_BUCKETS: usize = 1 << 16;

/// Bucket-priority queue over a token arena.
pub(crate) struct HierQueue {
  buckets: Vec<BucketList>,
  /// Over-lists (wide layout only).
  over: Option<Vec<BucketList>>,
  /// Current water level, as a key.
  level: u64,
  /// First key that must not be flooded (walk stops there).
  limit: u64,
  /// Wide layout: whether the window holding `level` has been bucketed.
  range_loaded: bool,
}

impl HierQueue {
  /// 256-bucket queue for 8-bit keys; walks every level by default.
  pub fn narrow() -> HierQueue {
    HierQueue {
      buckets: vec![BucketList::EMPTY; 256],
      over: None,
      level: 0,
      limit: 256,
      range_loaded: true,
    }
  }

  /// Two-stage queue for 32-bit keys.
  pub fn wide() -> HierQueue {
    HierQueue {
      buckets: vec![BucketList::EMPTY; RANGE_BUCKETS],
      over: Some(vec![BucketList::EMPTY; RANGE_BUCKETS]),
      level: 0,
      limit: 1 << 32,
      range_loaded: true,
    }
  }

  /// Caps the walk at `limit` levels (keys `0..limit`).
  pub fn set_limit(&mut self, limit: u64) {
    self.limit = self.limit.min(limit);
  }

  /// Current water level.
  pub fn level(&self) -> u64 {
    self.level
  }

  /// Queues `pos` at `key` without level clamping, through the over-lists
  /// in the wide layout. Seeding passes use this before the flood starts;
  /// the first pop then drains the lowest populated over-list.
  pub fn seed(&mut self, arena: &mut TokenArena, pos: u32, key: u32) {
    if let Some(over) = self.over.as_mut() {
      over[(key >> 16) as usize].insert_tail(arena, pos);
      self.range_loaded = false;
    } else {
      self.buckets[key as usize].insert_tail(arena, pos);
    }
  }

  /// Queues `pos` at `key`, clamped up to the current water level. Keys
  /// outside the current 16-bit window go to their over-list.
  pub fn insert(&mut self, arena: &mut TokenArena, pos: u32, key: u32) {
    let key = key.max(self.level.min(u32::MAX as u64) as u32);
    if self.over.is_some() {
      if (key >> 16) as u64 != self.level >> 16 {
        if let Some(over) = self.over.as_mut() {
          over[(key >> 16) as usize].insert_tail(arena, pos);
        }
      } else {
        self.buckets[(key & 0xFFFF) as usize].insert_tail(arena, pos);
      }
    } else {
      self.buckets[key as usize].insert_tail(arena, pos);
    }
  }

  /// Pops the next position in ascending key order, advancing the water
  /// level and draining over-lists as windows exhaust. `rekey` must return
  /// the current key of a position; it is only consulted while draining.
  ///
  /// Returns `None` once every remaining key reaches the limit or the
  /// queue is empty.
  pub fn pop(&mut self, arena: &mut TokenArena, mut rekey: impl FnMut(u32) -> u32) -> Option<u32> {
    loop {
      if self.level >= self.limit {
        return None;
      }
      if !self.range_loaded && !self.load_next_range(arena, &mut rekey) {
        return None;
      }
      if self.level >= self.limit {
        return None;
      }
      let wide = self.over.is_some();
      let b = if wide {
        (self.level & 0xFFFF) as usize
      } else {
        self.level as usize
      };
      if let Some(pos) = self.buckets[b].pop_head(arena) {
        return Some(pos);
      }
      if wide && self.level & 0xFFFF == 0xFFFF {
        // Window exhausted; the next pop loads a new one.
        self.range_loaded = false;
      }
      self.level += 1;
    }
  }

  /// Advances to the next populated over-list and re-buckets it. Returns
  /// false when no over-list holds positions anymore.
  fn load_next_range(&mut self, arena: &mut TokenArena, rekey: &mut impl FnMut(u32) -> u32) -> bool {
    let Some(over) = self.over.as_mut() else {
      self.range_loaded = true;
      return true;
    };
    let mut range = (self.level >> 16) as usize;
    while range < RANGE_BUCKETS && over[range].is_empty() {
      range += 1;
    }
    if range == RANGE_BUCKETS {
      return false;
    }
    let mut list = std::mem::replace(&mut over[range], BucketList::EMPTY);
    // The current-range buckets are empty whenever the window advances;
    // reset them anyway so a drained window always starts clean.
    for b in self.buckets.iter_mut() {
      b.clear();
    }
    while let Some(pos) = list.pop_head(arena) {
      let key = rekey(pos);
      self.buckets[(key & 0xFFFF) as usize].insert_tail(arena, pos);
    }
    self.level = (range as u64) << 16;
    self.range_loaded = true;
    #[cfg(feature = "tracing")]
    tracing::debug!(range, "hierarchical queue advanced to next key window");
    true
  }
}

#[cfg(test)]
#[path = "hq_test.rs"]
mod hq_test;
