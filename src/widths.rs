//! Variant width selection over the breakpoint ladder.
//!
//! Every source image gets the ladder widths it can supply without
//! upsampling, plus its native width so full-size contexts never downgrade.
//! The math is pure and lives here so the encode pipeline and its tests
//! never disagree about which files a build produces.

/// Fixed candidate output widths considered for every source image.
pub const BREAKPOINTS: [u32; 5] = [320, 480, 768, 1024, 1400];

/// Compute the ordered set of output widths for one source image.
///
/// Ladder values ≤ the intrinsic width are kept; an image narrower than the
/// smallest breakpoint yields just its own width; the intrinsic width is
/// appended whenever it is not already the maximum. The result is strictly
/// ascending with no duplicates, never exceeds the source, and is non-empty
/// for any positive width. A zero width yields the empty set.
pub fn select_widths(intrinsic_width: u32) -> Vec<u32> {
    select_widths_from(&BREAKPOINTS, intrinsic_width)
}

/// [`select_widths`] against an arbitrary ladder (configuration override).
pub fn select_widths_from(ladder: &[u32], intrinsic_width: u32) -> Vec<u32> {
    if intrinsic_width == 0 {
        return Vec::new();
    }

    let mut selected: Vec<u32> = ladder
        .iter()
        .copied()
        .filter(|&w| w <= intrinsic_width)
        .collect();

    if selected.is_empty() {
        return vec![intrinsic_width];
    }

    if selected.last() != Some(&intrinsic_width) {
        selected.push(intrinsic_width);
    }

    selected.sort_unstable();
    selected.dedup();
    selected
}
