//! Small helpers shared by the renderer.

/// Reduce `items` to at most `cap + 1` evenly spaced elements, always keeping the first and last.
///
/// This is used to keep redrawing cheap while the diagram is being resized or dragged. If there are
/// not more than `cap` items, or `cap` is zero, everything is kept.
pub fn decimate<T: Clone>(items: &[T], cap: usize) -> Vec<T> {
    if cap == 0 || items.len() <= cap {
        return items.to_vec();
    }

    let last_idx = items.len() - 1;
    let mut prev: Option<usize> = None;

    items
        .iter()
        .enumerate()
        .filter(|&(i, _)| {
            let bucket = i * cap / last_idx;
            if prev.map(|p| bucket > p).unwrap_or(true) {
                prev = Some(bucket);
                true
            } else {
                false
            }
        })
        .map(|(_, item)| item.clone())
        .collect()
}

/// Round to the given number of decimal places, for display.
#[inline]
pub fn round_to(val: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (val * scale).round() / scale
}

#[cfg(test)]
pub mod test_tools {
    pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
        assert!(eps > 0.0);

        (val1 - val2).abs() < eps
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decimate_keeps_short_input() {
        let vals: Vec<usize> = (0..30).collect();
        assert_eq!(decimate(&vals, 50), vals);
        assert_eq!(decimate(&vals, 0), vals);
    }

    #[test]
    fn test_decimate_long_input() {
        let vals: Vec<usize> = (0..200).collect();
        let dec = decimate(&vals, 50);

        assert_eq!(dec.len(), 51);
        assert_eq!(dec[0], 0);
        assert_eq!(*dec.last().unwrap(), 199);
        assert!(dec.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(12.35, 0), 12.0);
        assert_eq!(round_to(-3.26, 1), -3.3);
    }
}
