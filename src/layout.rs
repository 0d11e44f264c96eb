//! Constraint layout
//!
//! Splits a rect into consecutive slices along one axis. The slices always
//! cover the parent exactly: no gaps, no overlaps, no rounding drift.
//!
//! Space is handed out in a fixed order:
//!
//! 1. `Length` and `Min` reserve their length.
//! 2. `Percentage` resolves against the original length of the area.
//! 3. If 1 and 2 claim more than the area, the last-declared constraint is
//!    shrunk first, down to zero, then the one before it, and so on.
//! 4. `Ratio` shares what is left.
//! 5. `Fill` (and `Min`, with weight 1) split the rest by weight.
//!
//! Integer rounding remainders go to the first constraints of a group in
//! declaration order. When no `Fill` or `Min` constraint is present, the
//! unclaimed space goes to the last constraint.
//!
//! The engine keeps no state between calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Rect;

/// Axis along which a rect is split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Slices laid out left to right
    Horizontal,
    /// Slices laid out top to bottom
    #[default]
    Vertical,
}

/// Layout hint for one slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constraint {
    /// Exactly this many cells
    Length(u16),
    /// Percentage (0-100) of the whole area
    Percentage(u16),
    /// Fraction `n / d` of the space left after lengths and percentages
    Ratio(u32, u32),
    /// At least this many cells; grows like `Fill(1)`
    Min(u16),
    /// Share of the leftover space, proportional to the weight
    Fill(u16),
}

/// Malformed constraint list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Constraint {index}: percentage {value} exceeds 100")]
    PercentageOutOfRange { index: usize, value: u16 },

    #[error("Constraint {index}: ratio has a zero denominator")]
    ZeroDenominator { index: usize },

    #[error("Constraint {index}: fill weight must be positive")]
    ZeroFillWeight { index: usize },

    #[error("Layout has {constraints} constraints but {children} children")]
    ChildCount { constraints: usize, children: usize },
}

/// A validated constraint list bound to a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    direction: Direction,
    constraints: Vec<Constraint>,
    margin: u16,
}

impl Layout {
    pub fn new(
        direction: Direction,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Result<Self, LayoutError> {
        let constraints: Vec<Constraint> = constraints.into_iter().collect();
        validate(&constraints)?;
        Ok(Self {
            direction,
            constraints,
            margin: 0,
        })
    }

    pub fn horizontal(
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Result<Self, LayoutError> {
        Self::new(Direction::Horizontal, constraints)
    }

    pub fn vertical(constraints: impl IntoIterator<Item = Constraint>) -> Result<Self, LayoutError> {
        Self::new(Direction::Vertical, constraints)
    }

    /// Leave `margin` cells on every side of the area before splitting
    pub fn margin(mut self, margin: u16) -> Self {
        self.margin = margin;
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Split `area` into one rect per constraint
    pub fn split(&self, area: Rect) -> Vec<Rect> {
        let area = area.inner(self.margin);
        let length = match self.direction {
            Direction::Horizontal => area.width,
            Direction::Vertical => area.height,
        };

        let mut offset = match self.direction {
            Direction::Horizontal => area.x,
            Direction::Vertical => area.y,
        };

        resolve(length, &self.constraints)
            .into_iter()
            .map(|size| {
                let rect = match self.direction {
                    Direction::Horizontal => Rect::new(offset, area.y, size, area.height),
                    Direction::Vertical => Rect::new(area.x, offset, area.width, size),
                };
                offset = offset.saturating_add(size);
                rect
            })
            .collect()
    }
}

/// Split `area` along `direction`, validating the constraints first
pub fn split(
    area: Rect,
    direction: Direction,
    constraints: &[Constraint],
) -> Result<Vec<Rect>, LayoutError> {
    Ok(Layout::new(direction, constraints.iter().copied())?.split(area))
}

fn validate(constraints: &[Constraint]) -> Result<(), LayoutError> {
    for (index, constraint) in constraints.iter().enumerate() {
        match *constraint {
            Constraint::Percentage(value) if value > 100 => {
                return Err(LayoutError::PercentageOutOfRange { index, value });
            },
            Constraint::Ratio(_, 0) => return Err(LayoutError::ZeroDenominator { index }),
            Constraint::Fill(0) => return Err(LayoutError::ZeroFillWeight { index }),
            _ => {},
        }
    }
    Ok(())
}

/// Resolve constraints to lengths summing exactly to `total`
fn resolve(total: u16, constraints: &[Constraint]) -> Vec<u16> {
    if constraints.is_empty() {
        return Vec::new();
    }
    let total = total as u64;
    let mut sizes = vec![0u64; constraints.len()];

    for (i, constraint) in constraints.iter().enumerate() {
        if let Constraint::Length(n) | Constraint::Min(n) = *constraint {
            sizes[i] = n as u64;
        }
    }

    let percentages: Vec<(usize, u64, u64)> = constraints
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match *c {
            Constraint::Percentage(p) => Some((i, p as u64, 100)),
            _ => None,
        })
        .collect();
    for (i, share) in apportion(total, &percentages) {
        sizes[i] = share;
    }

    let all: Vec<usize> = (0..constraints.len()).collect();
    truncate_from_last(&mut sizes, &all, total);

    let remaining = total - sizes.iter().sum::<u64>();
    let ratios: Vec<(usize, u64, u64)> = constraints
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match *c {
            Constraint::Ratio(n, d) => Some((i, n as u64, d as u64)),
            _ => None,
        })
        .collect();
    for (i, share) in apportion(remaining, &ratios) {
        sizes[i] = share;
    }
    let ratio_indices: Vec<usize> = ratios.iter().map(|&(i, _, _)| i).collect();
    truncate_from_last(&mut sizes, &ratio_indices, total);

    let remaining = total - sizes.iter().sum::<u64>();
    let flexible: Vec<(usize, u64)> = constraints
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match *c {
            Constraint::Fill(w) => Some((i, w as u64)),
            Constraint::Min(_) => Some((i, 1)),
            _ => None,
        })
        .collect();

    if flexible.is_empty() {
        if let Some(last) = sizes.last_mut() {
            *last += remaining;
        }
    } else {
        let weight_sum: u64 = flexible.iter().map(|&(_, w)| w).sum();
        let parts: Vec<(usize, u64, u64)> =
            flexible.iter().map(|&(i, w)| (i, w, weight_sum)).collect();
        for (i, share) in apportion(remaining, &parts) {
            sizes[i] += share;
        }
    }

    sizes.into_iter().map(|s| s as u16).collect()
}

/// Give each `(index, num, den)` part `floor(base * num / den)`, then hand the
/// rounding remainder of the group (`floor(base * Σ num/den)`, capped at
/// `base`, minus the floored shares) out one cell at a time in declaration
/// order.
///
/// When the exact sum does not fit in 128 bits the remainder is dropped and
/// the group keeps its floored shares.
fn apportion(base: u64, parts: &[(usize, u64, u64)]) -> Vec<(usize, u64)> {
    if parts.is_empty() {
        return Vec::new();
    }

    let base = base as u128;
    let mut shares: Vec<(usize, u64)> = parts
        .iter()
        .map(|&(i, num, den)| (i, (base * num as u128 / den as u128) as u64))
        .collect();

    let floored: u64 = shares.iter().map(|&(_, s)| s).sum();
    let group_total = match group_total(base, parts) {
        Some(total) => total,
        None => floored.min(base as u64),
    };

    let mut remainder = group_total.saturating_sub(floored);
    for (_, share) in shares.iter_mut() {
        if remainder == 0 {
            break;
        }
        *share += 1;
        remainder -= 1;
    }
    shares
}

/// `floor(base * Σ num/den)` capped at `base`, or `None` on overflow
fn group_total(base: u128, parts: &[(usize, u64, u64)]) -> Option<u64> {
    // Exact Σ num/den as a reduced fraction
    let (mut sum_num, mut sum_den) = (0u128, 1u128);
    for &(_, num, den) in parts {
        let (num, den) = (num as u128, den as u128);
        sum_num = sum_num
            .checked_mul(den)?
            .checked_add(num.checked_mul(sum_den)?)?;
        sum_den = sum_den.checked_mul(den)?;
        let g = gcd(sum_num, sum_den);
        sum_num /= g;
        sum_den /= g;
        if sum_num >= sum_den {
            return Some(base as u64);
        }
    }
    Some((base.checked_mul(sum_num)? / sum_den).min(base) as u64)
}

/// Shrink `indices` starting from the last one until the sizes sum to at
/// most `total`
fn truncate_from_last(sizes: &mut [u64], indices: &[usize], total: u64) {
    let used: u64 = sizes.iter().sum();
    if used <= total {
        return;
    }
    let mut excess = used - total;
    for &i in indices.iter().rev() {
        if excess == 0 {
            break;
        }
        let cut = sizes[i].min(excess);
        sizes[i] -= cut;
        excess -= cut;
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Constraint::*;

    fn heights(total: u16, constraints: &[Constraint]) -> Vec<u16> {
        split(Rect::new(0, 0, 20, total), Direction::Vertical, constraints)
            .unwrap()
            .iter()
            .map(|r| r.height)
            .collect()
    }

    #[test]
    fn test_fixed_percentage_fill() {
        let rects = split(
            Rect::new(0, 0, 20, 10),
            Direction::Vertical,
            &[Length(2), Percentage(50), Fill(1)],
        )
        .unwrap();
        assert_eq!(
            rects,
            vec![
                Rect::new(0, 0, 20, 2),
                Rect::new(0, 2, 20, 5),
                Rect::new(0, 7, 20, 3),
            ]
        );
    }

    #[test]
    fn test_horizontal_split() {
        let rects = split(
            Rect::new(5, 1, 12, 3),
            Direction::Horizontal,
            &[Length(4), Fill(1)],
        )
        .unwrap();
        assert_eq!(rects, vec![Rect::new(5, 1, 4, 3), Rect::new(9, 1, 8, 3)]);
    }

    #[test]
    fn test_percentage_uses_original_length() {
        // 50% of 10 regardless of the 6 cells reserved before it
        assert_eq!(heights(10, &[Length(6), Percentage(50)]), vec![6, 4]);
        assert_eq!(heights(10, &[Percentage(50), Length(6)]), vec![5, 5]);
    }

    #[test]
    fn test_overflow_truncates_last_declared_first() {
        assert_eq!(heights(10, &[Length(6), Length(6), Length(6)]), vec![6, 4, 0]);
        assert_eq!(heights(5, &[Percentage(80), Length(4)]), vec![4, 1]);
        assert_eq!(heights(3, &[Length(6), Fill(1)]), vec![3, 0]);
    }

    #[test]
    fn test_rounding_remainder_goes_first() {
        assert_eq!(heights(10, &[Fill(1), Fill(1), Fill(1)]), vec![4, 3, 3]);
        assert_eq!(
            heights(10, &[Percentage(33), Percentage(33), Percentage(34)]),
            vec![4, 3, 3]
        );
    }

    #[test]
    fn test_ratio_shares_remaining_space() {
        assert_eq!(heights(12, &[Length(2), Ratio(1, 2), Ratio(1, 2)]), vec![2, 5, 5]);
        assert_eq!(heights(10, &[Ratio(1, 3), Ratio(1, 3), Ratio(1, 3)]), vec![4, 3, 3]);
        assert_eq!(heights(10, &[Ratio(3, 4), Ratio(3, 4)]), vec![7, 3]);
    }

    #[test]
    fn test_fill_weights() {
        assert_eq!(heights(9, &[Fill(1), Fill(2)]), vec![3, 6]);
        assert_eq!(heights(10, &[Length(1), Fill(3), Fill(1)]), vec![1, 7, 2]);
    }

    #[test]
    fn test_min_grows() {
        assert_eq!(heights(10, &[Min(2), Length(3)]), vec![7, 3]);
        assert_eq!(heights(10, &[Min(2), Fill(1)]), vec![6, 4]);
    }

    #[test]
    fn test_slack_goes_to_last_without_fill() {
        assert_eq!(heights(10, &[Length(2), Length(3)]), vec![2, 8]);
        assert_eq!(heights(10, &[Percentage(10)]), vec![10]);
    }

    #[test]
    fn test_empty_constraints() {
        assert!(heights(10, &[]).is_empty());
    }

    #[test]
    fn test_zero_area() {
        assert_eq!(heights(0, &[Length(3), Fill(1)]), vec![0, 0]);
    }

    #[test]
    fn test_malformed_constraints() {
        assert_eq!(
            Layout::vertical([Length(1), Percentage(101)]).unwrap_err(),
            LayoutError::PercentageOutOfRange {
                index: 1,
                value: 101
            }
        );
        assert_eq!(
            Layout::vertical([Ratio(1, 0)]).unwrap_err(),
            LayoutError::ZeroDenominator { index: 0 }
        );
        assert_eq!(
            Layout::vertical([Fill(0)]).unwrap_err(),
            LayoutError::ZeroFillWeight { index: 0 }
        );
    }

    #[test]
    fn test_margin() {
        let layout = Layout::horizontal([Fill(1), Fill(1)]).unwrap().margin(1);
        let rects = layout.split(Rect::new(0, 0, 10, 4));
        assert_eq!(rects, vec![Rect::new(1, 1, 4, 2), Rect::new(5, 1, 4, 2)]);
    }

    #[test]
    fn test_ratios_with_huge_denominators() {
        let constraints = [
            Ratio(1, 4294967291),
            Ratio(1, 4294967279),
            Ratio(1, 4294967231),
            Ratio(1, 4294967197),
            Ratio(1, 4294967189),
        ];
        assert_eq!(heights(10, &constraints), vec![0, 0, 0, 0, 10]);
    }

    #[test]
    fn test_ratios_with_huge_denominators_summing_past_one() {
        let constraints = [
            Ratio(4294967290, 4294967291),
            Ratio(4294967278, 4294967279),
            Ratio(1, 4294967231),
            Fill(1),
        ];
        let sizes = heights(10, &constraints);
        assert_eq!(sizes.iter().sum::<u16>(), 10);
        assert_eq!(sizes[3], 0);
    }

    #[test]
    fn test_area_reaching_coordinate_limit() {
        let rects = split(
            Rect::new(u16::MAX - 5, 0, 20, 1),
            Direction::Horizontal,
            &[Fill(1), Fill(1)],
        )
        .unwrap();
        assert_eq!(rects[0], Rect::new(u16::MAX - 5, 0, 10, 1));
        assert_eq!(rects[1].x, u16::MAX);
        assert_eq!(rects[1].width, 10);
    }
}
