//! # Hierarchical free-slot bitmap
//!
//! `SlotFinder` tracks an in-use flag per slot and answers "first free", "first used",
//! "n-th used" and "how many used" in O(log32 n) by keeping a pyramid of bitmaps over the flags.
//!
//! ```text
//! e.g. 4 flags per bin instead of 32
//! layer 0 | 1101 | 0011 | 1001 | 1111 | 0000 | 111* |        numFlags: 23
//! layer 1 | 1111 | 11** |  OR: bin below has any flag set  numFlags: 6
//!         | 0001 | 00** | AND: bin below is full
//! layer 2 | 11** |        OR                                numFlags: 2
//!         | 00** |        AND
//! ```
//!
//! Every layer above the leaf stores both reductions: descending through the AND view skips
//! full blocks when looking for a free slot, the OR view skips empty blocks when looking for a
//! used one. Each bin additionally caches how many leaf flags are set underneath it, which turns
//! the rank query into a walk down the pyramid.
//!
//! All storage is flat: one buffer for every layer's bins and one for the per-bin counts, indexed
//! through per-layer offsets.
//!
//! Out-of-range slot indices and use of an uninitialized instance are caller bugs. They are
//! checked with `debug_assert!` only; in release builds such calls index past the logical end of
//! the flags and may panic on a bounds check or silently corrupt the aggregates.

use tracing::{debug, trace};

use crate::bits::{nth_set_bit, popcnt, tzcnt};


const FLAGS_PER_BIN: u32 = 32;

// indices into `offsets_to_or_and` entries
const OR: usize = 0;
const AND: usize = 1;

fn num_bins_for_flags(num_flags: u32) -> u32 {
    num_flags.div_ceil(FLAGS_PER_BIN).max(1)
}

/// Bits of bin `bin_idx` lying past the end of a layer with `num_flags` flags.
fn padding_mask(num_flags: u32, bin_idx: u32) -> u32 {
    let valid = num_flags.saturating_sub(bin_idx.saturating_mul(FLAGS_PER_BIN));
    if valid >= FLAGS_PER_BIN {
        0
    } else {
        u32::MAX << valid
    }
}

/// Move-only; `Default` is the uninitialized state, so `std::mem::take` hands the storage over
/// and leaves an uninitialized instance behind.
#[derive(Default)]
pub struct SlotFinder {
    num_layers: u32,
    num_lowest_flag_bins: u32,
    // leaf bins, then OR bins and AND bins of every upper layer
    flag_bins: Vec<u32>,
    offsets_to_or_and: Vec<[usize; 2]>,
    num_used_flags_under_bin_list: Vec<u32>,
    offsets_to_num_used_flags: Vec<usize>,
    num_flags_in_layer_list: Vec<u32>,
}

impl SlotFinder {
    pub const INVALID_SLOT_INDEX: u32 = 0xFFFF_FFFF;

    pub fn new(num_slots: u32) -> SlotFinder {
        let mut slot_finder = SlotFinder::default();
        slot_finder.initialize(num_slots);
        slot_finder
    }

    /// Allocates the pyramid for `num_slots` flags, all unused. Zero slots is allowed and gives
    /// an allocator on which every query comes back empty.
    pub fn initialize(&mut self, num_slots: u32) {
        debug_assert!(!self.is_initialized(), "SlotFinder is already initialized");

        let mut num_flags_in_layer_list = vec![num_slots];
        let mut num_flags = num_slots;
        while num_bins_for_flags(num_flags) > 1 {
            num_flags = num_bins_for_flags(num_flags);
            num_flags_in_layer_list.push(num_flags);
        }

        let num_layers = num_flags_in_layer_list.len();
        let num_lowest_flag_bins = num_bins_for_flags(num_slots);

        let mut offsets_to_or_and = Vec::with_capacity(num_layers);
        let mut offsets_to_num_used_flags = Vec::with_capacity(num_layers);
        // leaf flags are their own OR and AND reduction
        offsets_to_or_and.push([0, 0]);
        offsets_to_num_used_flags.push(0);
        let mut num_total_compiled_flag_bins = 0;
        let mut num_used_entries = num_lowest_flag_bins as usize;
        for &num_flags in &num_flags_in_layer_list[1..] {
            let num_bins = num_bins_for_flags(num_flags);
            let or_offset = (num_lowest_flag_bins + num_total_compiled_flag_bins) as usize;
            offsets_to_or_and.push([or_offset, or_offset + num_bins as usize]);
            num_total_compiled_flag_bins += 2 * num_bins;

            offsets_to_num_used_flags.push(num_used_entries);
            num_used_entries += num_bins as usize;
        }

        *self = SlotFinder {
            num_layers: num_layers as u32,
            num_lowest_flag_bins,
            flag_bins: vec![0; (num_lowest_flag_bins + num_total_compiled_flag_bins) as usize],
            offsets_to_or_and,
            num_used_flags_under_bin_list: vec![0; num_used_entries],
            offsets_to_num_used_flags,
            num_flags_in_layer_list,
        };

        trace!(
            num_slots,
            num_layers = self.num_layers,
            num_bins = self.flag_bins.len(),
            "initialized slot finder"
        );
    }

    /// Releases all storage. Safe to call repeatedly.
    pub fn finalize(&mut self) {
        *self = SlotFinder::default();
    }

    /// Changes the capacity, keeping the usage of every slot that still exists.
    pub fn resize(&mut self, num_slots: u32) {
        if !self.is_initialized() {
            self.initialize(num_slots);
            return;
        }
        if num_slots == self.get_num_slots() {
            return;
        }

        let mut resized = SlotFinder::new(num_slots);

        let num_kept_slots = u32::min(num_slots, self.get_num_slots());
        let num_full_bins = (num_kept_slots / FLAGS_PER_BIN) as usize;
        resized.flag_bins[..num_full_bins].copy_from_slice(&self.flag_bins[..num_full_bins]);
        let num_tail_flags = num_kept_slots % FLAGS_PER_BIN;
        if num_tail_flags > 0 {
            let tail_mask = !(u32::MAX << num_tail_flags);
            resized.flag_bins[num_full_bins] = self.flag_bins[num_full_bins] & tail_mask;
        }
        resized.aggregate();

        trace!(
            from = self.get_num_slots(),
            to = num_slots,
            num_used = resized.get_num_used(),
            "resized slot finder"
        );
        *self = resized;
    }

    /// Marks every slot unused without touching the allocation.
    pub fn reset(&mut self) {
        self.flag_bins.fill(0);
        self.num_used_flags_under_bin_list.fill(0);
    }

    pub fn is_initialized(&self) -> bool {
        self.num_layers > 0
    }

    fn or_bin(&self, layer: u32, bin_idx: u32) -> u32 {
        self.flag_bins[self.offsets_to_or_and[layer as usize][OR] + bin_idx as usize]
    }

    fn and_bin(&self, layer: u32, bin_idx: u32) -> u32 {
        self.flag_bins[self.offsets_to_or_and[layer as usize][AND] + bin_idx as usize]
    }

    fn num_used_index(&self, layer: u32, bin_idx: u32) -> usize {
        self.offsets_to_num_used_flags[layer as usize] + bin_idx as usize
    }

    fn num_bins_in_layer(&self, layer: u32) -> u32 {
        num_bins_for_flags(self.num_flags_in_layer_list[layer as usize])
    }

    fn is_full(&self, layer: u32, bin_idx: u32) -> bool {
        let padding = padding_mask(self.num_flags_in_layer_list[layer as usize], bin_idx);
        (self.and_bin(layer, bin_idx) | padding) == u32::MAX
    }

    /// Rebuilds every upper layer and all used counts from the leaf flags.
    fn aggregate(&mut self) {
        for bin_idx in 0..self.num_lowest_flag_bins {
            let count = popcnt(self.flag_bins[bin_idx as usize]);
            let idx = self.num_used_index(0, bin_idx);
            self.num_used_flags_under_bin_list[idx] = count;
        }

        for layer in 1..self.num_layers {
            let num_children = self.num_bins_in_layer(layer - 1);
            let [or_offset, and_offset] = self.offsets_to_or_and[layer as usize];
            for bin_idx in 0..self.num_bins_in_layer(layer) {
                let mut or_bin = 0;
                let mut and_bin = 0;
                let mut num_used = 0;
                let first_child = bin_idx * FLAGS_PER_BIN;
                for child in first_child..u32::min(first_child + FLAGS_PER_BIN, num_children) {
                    let flag = 1 << (child % FLAGS_PER_BIN);
                    if self.or_bin(layer - 1, child) != 0 {
                        or_bin |= flag;
                    }
                    if self.is_full(layer - 1, child) {
                        and_bin |= flag;
                    }
                    let child_used_idx = self.num_used_index(layer - 1, child);
                    num_used += self.num_used_flags_under_bin_list[child_used_idx];
                }

                self.flag_bins[or_offset + bin_idx as usize] = or_bin;
                self.flag_bins[and_offset + bin_idx as usize] = and_bin;
                let idx = self.num_used_index(layer, bin_idx);
                self.num_used_flags_under_bin_list[idx] = num_used;
            }
        }
    }

    /// Marks `slot_idx` as used. Setting a slot that is already used is a no-op.
    pub fn set_in_use(&mut self, slot_idx: u32) {
        debug_assert!(
            slot_idx < self.get_num_slots(),
            "slot index out of range: {slot_idx} >= {}",
            self.get_num_slots()
        );

        let mut bin_idx = slot_idx / FLAGS_PER_BIN;
        let flag = 1 << (slot_idx % FLAGS_PER_BIN);
        let leaf = &mut self.flag_bins[bin_idx as usize];
        if *leaf & flag != 0 {
            return;
        }
        *leaf |= flag;

        let mut child_full = self.is_full(0, bin_idx);
        for layer in 0..self.num_layers {
            let idx = self.num_used_index(layer, bin_idx);
            self.num_used_flags_under_bin_list[idx] += 1;

            let upper_layer = layer + 1;
            if upper_layer == self.num_layers {
                break;
            }

            let parent_idx = bin_idx / FLAGS_PER_BIN;
            let flag = 1 << (bin_idx % FLAGS_PER_BIN);
            let [or_offset, and_offset] = self.offsets_to_or_and[upper_layer as usize];
            self.flag_bins[or_offset + parent_idx as usize] |= flag;
            if child_full {
                self.flag_bins[and_offset + parent_idx as usize] |= flag;
            }

            child_full = self.is_full(upper_layer, parent_idx);
            bin_idx = parent_idx;
        }
    }

    /// Marks `slot_idx` as unused. Clearing a slot that is already unused is a no-op.
    pub fn set_not_in_use(&mut self, slot_idx: u32) {
        debug_assert!(
            slot_idx < self.get_num_slots(),
            "slot index out of range: {slot_idx} >= {}",
            self.get_num_slots()
        );

        let mut bin_idx = slot_idx / FLAGS_PER_BIN;
        let flag = 1 << (slot_idx % FLAGS_PER_BIN);
        let leaf = &mut self.flag_bins[bin_idx as usize];
        if *leaf & flag == 0 {
            return;
        }
        *leaf &= !flag;

        let mut child_empty = *leaf == 0;
        for layer in 0..self.num_layers {
            let idx = self.num_used_index(layer, bin_idx);
            self.num_used_flags_under_bin_list[idx] -= 1;

            let upper_layer = layer + 1;
            if upper_layer == self.num_layers {
                break;
            }

            let parent_idx = bin_idx / FLAGS_PER_BIN;
            let flag = 1 << (bin_idx % FLAGS_PER_BIN);
            let [or_offset, and_offset] = self.offsets_to_or_and[upper_layer as usize];
            // the child just lost a flag, so it can't be full anymore
            self.flag_bins[and_offset + parent_idx as usize] &= !flag;
            if child_empty {
                self.flag_bins[or_offset + parent_idx as usize] &= !flag;
            }

            child_empty = self.or_bin(upper_layer, parent_idx) == 0;
            bin_idx = parent_idx;
        }
    }

    pub fn get_usage(&self, slot_idx: u32) -> bool {
        debug_assert!(
            slot_idx < self.get_num_slots(),
            "slot index out of range: {slot_idx} >= {}",
            self.get_num_slots()
        );
        let bin_idx = slot_idx / FLAGS_PER_BIN;
        let flag_idx_in_bin = slot_idx % FLAGS_PER_BIN;
        (self.flag_bins[bin_idx as usize] >> flag_idx_in_bin) & 0x1 != 0
    }

    /// Lowest unused slot, or `INVALID_SLOT_INDEX` if every slot is in use.
    pub fn get_first_available_slot(&self) -> u32 {
        if !self.is_initialized() {
            return Self::INVALID_SLOT_INDEX;
        }

        let mut bin_idx = 0;
        for layer in (0..self.num_layers).rev() {
            let padding = padding_mask(self.num_flags_in_layer_list[layer as usize], bin_idx);
            let full_flags = self.and_bin(layer, bin_idx) | padding;
            if full_flags == u32::MAX {
                return Self::INVALID_SLOT_INDEX;
            }
            bin_idx = bin_idx * FLAGS_PER_BIN + tzcnt(!full_flags);
        }

        bin_idx
    }

    /// Lowest used slot, or `INVALID_SLOT_INDEX` if no slot is in use.
    pub fn get_first_used_slot(&self) -> u32 {
        if !self.is_initialized() {
            return Self::INVALID_SLOT_INDEX;
        }

        let mut bin_idx = 0;
        for layer in (0..self.num_layers).rev() {
            let used_flags = self.or_bin(layer, bin_idx);
            if used_flags == 0 {
                return Self::INVALID_SLOT_INDEX;
            }
            bin_idx = bin_idx * FLAGS_PER_BIN + tzcnt(used_flags);
        }

        bin_idx
    }

    /// Index of the `n`-th (0-based, ascending) used slot, or `INVALID_SLOT_INDEX` if fewer
    /// than `n + 1` slots are in use.
    pub fn find_nth_used_slot(&self, n: u32) -> u32 {
        if n >= self.get_num_used() {
            return Self::INVALID_SLOT_INDEX;
        }

        let mut bin_idx = 0;
        let mut remaining = n;
        for layer in (1..self.num_layers).rev() {
            let child_layer = layer - 1;
            let first_child = bin_idx * FLAGS_PER_BIN;
            let end_child =
                u32::min(first_child + FLAGS_PER_BIN, self.num_bins_in_layer(child_layer));

            let mut next_bin_idx = None;
            for child in first_child..end_child {
                let num_used =
                    self.num_used_flags_under_bin_list[self.num_used_index(child_layer, child)];
                if remaining < num_used {
                    next_bin_idx = Some(child);
                    break;
                }
                remaining -= num_used;
            }

            match next_bin_idx {
                Some(child) => bin_idx = child,
                None => return Self::INVALID_SLOT_INDEX,
            }
        }

        let flag_idx_in_bin = nth_set_bit(self.flag_bins[bin_idx as usize], remaining);
        if flag_idx_in_bin == u32::MAX {
            return Self::INVALID_SLOT_INDEX;
        }
        bin_idx * FLAGS_PER_BIN + flag_idx_in_bin
    }

    pub fn get_num_slots(&self) -> u32 {
        self.num_flags_in_layer_list.first().copied().unwrap_or(0)
    }

    pub fn get_num_used(&self) -> u32 {
        match self.offsets_to_num_used_flags.last() {
            Some(&offset) => self.num_used_flags_under_bin_list[offset],
            None => 0,
        }
    }

    pub fn get_num_layers(&self) -> u32 {
        self.num_layers
    }

    /// Dumps every layer at debug level.
    pub fn debug_print(&self) {
        debug!(
            num_slots = self.get_num_slots(),
            num_used = self.get_num_used(),
            num_layers = self.num_layers,
            "slot finder"
        );
        for layer in 0..self.num_layers {
            let num_bins = self.num_bins_in_layer(layer);
            let num_used = |bin_idx: u32| {
                self.num_used_flags_under_bin_list[self.num_used_index(layer, bin_idx)]
            };

            if layer == 0 {
                for bin_idx in 0..num_bins {
                    debug!(
                        "layer 0 bin {bin_idx:>6}: {:032b} ({} used)",
                        self.or_bin(0, bin_idx).reverse_bits(),
                        num_used(bin_idx)
                    );
                }
            } else {
                for bin_idx in 0..num_bins {
                    debug!(
                        "layer {layer} bin {bin_idx:>6}: OR {:032b} AND {:032b} ({} used)",
                        self.or_bin(layer, bin_idx).reverse_bits(),
                        self.and_bin(layer, bin_idx).reverse_bits(),
                        num_used(bin_idx)
                    );
                }
            }
        }
    }
}
