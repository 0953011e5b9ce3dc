// [libs/core-ipgen/src/blocks.rs]
//! Partitions `[start_ip, end_ip)` into strides of `block_size`,
//! excising the three RFC1918 private ranges. Lazily produced: the
//! original Python implementation built the whole `Vec<(u32, u32)>`
//! up front (see its own docstring aside, "Perhaps make this a
//! generator function?"); here it is an `Iterator` so a 2^32-wide
//! sweep never materializes more than one stride at a time.

use rdns_domain_models::config::PRIVATE_RANGES;
use tracing::debug;

/// Emits `(ipfrom, ipto)` pairs covering `[start, end)` in strides of
/// `block_size`, skipping or trimming any stride that overlaps private
/// address space.
pub struct Ipv4BlockGenerator {
    cursor: u64,
    end: u64,
    block_size: u32,
}

impl Ipv4BlockGenerator {
    pub fn new(start_ip: u32, end_ip: u32, block_size: u32) -> Self {
        assert!(block_size > 0, "block_size must be positive");
        Self {
            cursor: start_ip as u64,
            end: end_ip as u64,
            block_size,
        }
    }
}

impl Iterator for Ipv4BlockGenerator {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.end {
            let stride_start = self.cursor;
            let stride_end = (stride_start + self.block_size as u64).min(self.end);
            self.cursor = stride_end;

            match classify_stride(stride_start, stride_end) {
                StrideClass::FullyPrivate => {
                    debug!(start = stride_start, end = stride_end, "stride fully inside private range, skipped");
                    continue;
                }
                StrideClass::TrimLeft(private_end) => {
                    let emit_from = private_end + 1;
                    debug!(start = stride_start, end = stride_end, "stride straddles private range low edge");
                    return Some((emit_from as u32, stride_end as u32));
                }
                StrideClass::TrimRight(private_start) => {
                    debug!(start = stride_start, end = stride_end, "stride straddles private range high edge");
                    return Some((stride_start as u32, private_start as u32));
                }
                StrideClass::Clear => {
                    return Some((stride_start as u32, stride_end as u32));
                }
            }
        }
        None
    }
}

enum StrideClass {
    Clear,
    FullyPrivate,
    /// Stride's low edge falls inside a private range; the emitted
    /// block starts right after the private range ends.
    TrimLeft(u64),
    /// Stride's high edge falls inside a private range; the emitted
    /// block ends right at the private range's start.
    TrimRight(u64),
}

/// A stride is represented as the inclusive address range
/// `[start, end - 1]` when checking for overlap, matching the
/// half-open convention used everywhere else in this crate.
fn classify_stride(start: u64, end: u64) -> StrideClass {
    let last = end - 1;
    for &(private_start, private_end) in PRIVATE_RANGES.iter() {
        let (private_start, private_end) = (private_start as u64, private_end as u64);
        let start_in = start >= private_start && start <= private_end;
        let last_in = last >= private_start && last <= private_end;
        if start_in && last_in {
            return StrideClass::FullyPrivate;
        } else if start_in && !last_in {
            return StrideClass::TrimLeft(private_end);
        } else if !start_in && last_in {
            return StrideClass::TrimRight(private_start);
        }
    }
    StrideClass::Clear
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdns_domain_models::config::PRIVATE_RANGES;

    fn ip(s: &str) -> u32 {
        crate::ip::ip_to_u32(s).unwrap()
    }

    #[test]
    fn emits_disjoint_blocks_covering_full_range_minus_private_space() {
        let start = ip("9.255.255.0");
        let end = ip("11.0.1.0");
        let blocks: Vec<_> = Ipv4BlockGenerator::new(start, end, 256).collect();

        // (9.255.255.0, 10.0.0.0), then the whole of 10/8 is skipped,
        // then the single remaining 256-stride (11.0.0.0, 11.0.1.0).
        assert_eq!(blocks, vec![
            (ip("9.255.255.0"), ip("10.0.0.0")),
            (ip("11.0.0.0"), ip("11.0.1.0")),
        ]);

        for &(a, b) in &blocks {
            assert!(a < b);
            for &(priv_start, priv_end) in PRIVATE_RANGES.iter() {
                let overlaps = a as u64 <= priv_end as u64 && (b - 1) as u64 >= priv_start as u64;
                assert!(!overlaps, "block ({a}, {b}) overlaps private range ({priv_start}, {priv_end})");
            }
        }
    }

    #[test]
    fn low_edge_straddle_trims_to_private_range_start() {
        let start = ip("9.255.255.0");
        let end = ip("10.0.0.64");
        let blocks: Vec<_> = Ipv4BlockGenerator::new(start, end, 256).collect();
        assert_eq!(blocks, vec![(ip("9.255.255.0"), ip("10.0.0.0"))]);
    }

    #[test]
    fn high_edge_straddle_trims_to_private_range_end_plus_one() {
        let start = ip("192.167.255.192");
        let end = ip("192.168.0.64");
        let blocks: Vec<_> = Ipv4BlockGenerator::new(start, end, 256).collect();
        assert_eq!(blocks, vec![(ip("192.167.255.192"), ip("192.168.0.0"))]);
    }

    #[test]
    fn every_block_respects_the_configured_block_size() {
        let blocks: Vec<_> = Ipv4BlockGenerator::new(ip("1.0.0.0"), ip("1.0.10.0"), 4096).collect();
        for (a, b) in blocks {
            assert!(b - a <= 4096);
        }
    }

    #[test]
    fn generator_is_lazy_not_preallocated() {
        // A full-space sweep must be iterable without building a Vec:
        // calling next() once must not panic or attempt a huge allocation.
        let mut generator = Ipv4BlockGenerator::new(0, u32::MAX, 4096);
        assert!(generator.next().is_some());
    }
}
