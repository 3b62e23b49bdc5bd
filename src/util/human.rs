/// Unit letters for successive 1024-divisions past the base unit.
const UNITS: &[char] = &['K', 'M', 'G', 'T', 'P', 'E'];

/// Format a raw byte count into a human-readable string: "12.5 MB".
///
/// Binary (power-of-1024) scale with one decimal digit; counts below
/// 1024 render as a bare integer: "512 B".
pub fn fmt_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;

    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let (mut div, mut exp) = (UNIT, 0usize);
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", bytes as f64 / div as f64, UNITS[exp])
}

/// Format a percentage with one decimal: "84.5%".
pub fn fmt_pct(pct: f64) -> String {
    format!("{:.1}%", pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_below_1024_render_as_integers() {
        assert_eq!(fmt_bytes(0), "0 B");
        assert_eq!(fmt_bytes(1), "1 B");
        assert_eq!(fmt_bytes(999), "999 B");
        assert_eq!(fmt_bytes(1023), "1023 B");
    }

    #[test]
    fn binary_scale_with_one_decimal() {
        assert_eq!(fmt_bytes(1024), "1.0 KB");
        assert_eq!(fmt_bytes(1536), "1.5 KB");
        assert_eq!(fmt_bytes(1_048_576), "1.0 MB");
        assert_eq!(fmt_bytes(1_073_741_824), "1.0 GB");
        assert_eq!(fmt_bytes(1_099_511_627_776), "1.0 TB");
    }

    #[test]
    fn large_counts_reach_petabyte_and_exabyte_units() {
        assert_eq!(fmt_bytes(1u64 << 50), "1.0 PB");
        assert_eq!(fmt_bytes(1u64 << 60), "1.0 EB");
        assert_eq!(fmt_bytes(u64::MAX), "16.0 EB");
    }

    #[test]
    fn just_under_a_unit_boundary_stays_in_the_lower_unit() {
        assert_eq!(fmt_bytes(1024 * 1024 - 1), "1024.0 KB");
    }

    #[test]
    fn pct_renders_one_decimal() {
        assert_eq!(fmt_pct(84.5), "84.5%");
        assert_eq!(fmt_pct(0.0), "0.0%");
    }
}
